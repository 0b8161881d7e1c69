use crate::admin::{Identity, Viewer};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Name of the cookie remembering a completed submission
pub const SUBMITTED_COOKIE: &str = "submitted";

/// Name of the cookie carrying the identity session id
pub const SESSION_COOKIE: &str = "session";

const SESSION_DURATION: u64 = 24 * 60 * 60; // 24 hours in seconds

/// Whether this browser already sent the form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    NotSubmitted,
    Submitted,
}

impl SubmissionState {
    /// Seed the state from the incoming `submitted` cookie value
    pub fn from_cookie(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim() == "true" => SubmissionState::Submitted,
            _ => SubmissionState::NotSubmitted,
        }
    }

    pub fn is_submitted(self) -> bool {
        self == SubmissionState::Submitted
    }
}

/// User session data
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Option<Identity>,
    pub secret_verified: bool,
    /// Time when the session expires
    pub expires_at: SystemTime,
}

/// Process-wide table of identity sessions keyed by session id
#[derive(Default)]
pub struct SessionDirectory {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store a session for an identity handed back by the provider
    ///
    /// # Returns
    /// * `String` - A unique session ID
    pub fn create_session(&self, identity: Identity) -> String {
        self.insert(Session {
            identity: Some(identity),
            secret_verified: false,
            expires_at: SystemTime::now() + Duration::from_secs(SESSION_DURATION),
        })
    }

    /// Record that the shared admin code was entered
    ///
    /// Reuses the existing session when it is still valid, otherwise opens
    /// an anonymous one. Returns the session id to set in the cookie.
    pub fn mark_secret_verified(&self, session_id: Option<&str>) -> String {
        if let Some(id) = session_id {
            let mut sessions = self.write();
            if let Some(session) = sessions.get_mut(id) {
                if session.expires_at > SystemTime::now() {
                    session.secret_verified = true;
                    return id.to_string();
                }
            }
        }

        self.insert(Session {
            identity: None,
            secret_verified: true,
            expires_at: SystemTime::now() + Duration::from_secs(SESSION_DURATION),
        })
    }

    /// Validate a session
    ///
    /// # Returns
    /// * `Option<Session>` - The session if it exists and has not expired
    pub fn validate_session(&self, session_id: &str) -> Option<Session> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        sessions
            .get(session_id)
            .filter(|session| session.expires_at > SystemTime::now())
            .cloned()
    }

    /// The viewer behind an optional session cookie value
    pub fn viewer(&self, session_id: Option<&str>) -> Viewer {
        match session_id.and_then(|id| self.validate_session(id)) {
            Some(session) => Viewer {
                identity: session.identity,
                secret_verified: session.secret_verified,
            },
            None => Viewer::default(),
        }
    }

    pub fn remove_session(&self, session_id: &str) {
        self.write().remove(session_id);
    }

    fn insert(&self, session: Session) -> String {
        let session_id = Uuid::new_v4().to_string();
        let mut sessions = self.write();
        sessions.retain(|_, s| s.expires_at > SystemTime::now());
        sessions.insert(session_id.clone(), session);
        session_id
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
