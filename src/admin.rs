//! Admin gate and the clear-all guard

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Identity supplied by the external login provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Who is looking at the page, as far as the session can tell
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Viewer {
    pub identity: Option<Identity>,
    /// The shared admin code was entered in this session
    pub secret_verified: bool,
}

/// How admin visibility is decided
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminPolicy {
    /// `admin=true` in the URL and an allow-listed email
    Identity { allow_list: Vec<String> },
    /// A code matching the configured string, regardless of the URL
    SharedSecret { code: String },
}

impl AdminPolicy {
    /// Check an entered code against the shared secret
    ///
    /// Always false under the identity policy.
    pub fn verify_code(&self, entered: &str) -> bool {
        match self {
            AdminPolicy::SharedSecret { code } => {
                let entered = entered.trim();
                !entered.is_empty() && constant_time_eq(entered.as_bytes(), code.as_bytes())
            }
            AdminPolicy::Identity { .. } => false,
        }
    }

    pub fn allows_email(&self, email: &str) -> bool {
        match self {
            AdminPolicy::Identity { allow_list } => {
                let email = email.trim();
                !email.is_empty()
                    && allow_list
                        .iter()
                        .any(|allowed| allowed.trim().eq_ignore_ascii_case(email))
            }
            AdminPolicy::SharedSecret { .. } => false,
        }
    }

    pub fn uses_secret(&self) -> bool {
        matches!(self, AdminPolicy::SharedSecret { .. })
    }
}

/// True when the query string carries `admin=true`
///
/// Accepts the search part with or without the leading `?`. Later
/// occurrences of the key override earlier ones.
pub fn admin_flag(url_search: &str) -> bool {
    let mut flag = false;
    for pair in url_search.trim_start_matches('?').split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != "admin" {
            continue;
        }
        let value = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_default();
        flag = value.trim().eq_ignore_ascii_case("true");
    }
    flag
}

/// Derive admin visibility for one request
///
/// # Arguments
/// * `policy` - Configured admin policy
/// * `url_search` - Raw query string of the current URL
/// * `viewer` - Session identity and secret state
///
/// # Examples
/// ```
/// use checkin::admin::{AdminPolicy, Identity, Viewer, is_admin};
///
/// let policy = AdminPolicy::Identity { allow_list: vec!["staff@example.org".to_string()] };
/// let viewer = Viewer {
///     identity: Some(Identity {
///         id: "1".to_string(),
///         name: "Staff".to_string(),
///         email: "Staff@Example.org".to_string(),
///     }),
///     secret_verified: false,
/// };
/// assert!(is_admin(&policy, "admin=true", &viewer));
/// assert!(!is_admin(&policy, "", &viewer));
/// ```
pub fn is_admin(policy: &AdminPolicy, url_search: &str, viewer: &Viewer) -> bool {
    match policy {
        AdminPolicy::Identity { .. } => {
            admin_flag(url_search)
                && viewer
                    .identity
                    .as_ref()
                    .is_some_and(|identity| policy.allows_email(&identity.email))
        }
        AdminPolicy::SharedSecret { .. } => viewer.secret_verified,
    }
}

/// Admin actions exposed on the page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdminCapabilities {
    pub download: bool,
    pub raw_table: bool,
    pub clear: bool,
}

impl AdminCapabilities {
    pub fn for_admin(admin: bool) -> Self {
        AdminCapabilities {
            download: admin,
            raw_table: admin,
            clear: admin,
        }
    }
}

/// How long a rendered clear button stays usable by default
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Outstanding tokens kept before the oldest are dropped
pub const MAX_OUTSTANDING_TOKENS: usize = 1024;

/// What happened to a clear request
#[derive(Debug, PartialEq, Eq)]
pub enum Redemption<E> {
    /// The action ran and every outstanding token was revoked
    Completed,
    /// The action failed; the token is still valid
    Failed(E),
    /// Never issued, already spent, or dropped to make room
    Unknown,
    /// Issued longer ago than the guard's lifetime
    Expired,
}

/// Single-use tokens for the destructive clear-all action
///
/// A token is handed out with every rendered clear button. Redeeming it runs
/// the action at most once; redelivery of the same click finds it spent.
/// Tokens expire after `ttl` and at most [`MAX_OUTSTANDING_TOKENS`] are held.
pub struct ClearGuard {
    ttl: Duration,
    /// Oldest first
    issued: Mutex<VecDeque<(Uuid, Instant)>>,
}

impl Default for ClearGuard {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TOKEN_TTL)
    }
}

impl ClearGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        ClearGuard {
            ttl,
            issued: Mutex::new(VecDeque::new()),
        }
    }

    pub fn issue(&self) -> Uuid {
        let token = Uuid::new_v4();
        let mut issued = self.lock();
        self.prune(&mut issued);
        while issued.len() >= MAX_OUTSTANDING_TOKENS {
            issued.pop_front();
        }
        issued.push_back((token, Instant::now()));
        token
    }

    /// Run `action` if `token` is live
    ///
    /// The guard stays locked while `action` runs, so two deliveries of the
    /// same token cannot both reach it. The token is spent only when the
    /// action succeeds, and success also revokes every other outstanding
    /// token so buttons rendered before it cannot wipe responses collected
    /// afterwards.
    pub fn redeem<E>(&self, token: &Uuid, action: impl FnOnce() -> Result<(), E>) -> Redemption<E> {
        let mut issued = self.lock();
        let Some(position) = issued.iter().position(|(id, _)| id == token) else {
            return Redemption::Unknown;
        };
        if self.is_expired(issued[position].1) {
            issued.remove(position);
            return Redemption::Expired;
        }

        match action() {
            Ok(()) => {
                issued.clear();
                Redemption::Completed
            }
            Err(e) => Redemption::Failed(e),
        }
    }

    /// Number of tokens still held
    pub fn outstanding(&self) -> usize {
        self.lock().len()
    }

    fn is_expired(&self, issued_at: Instant) -> bool {
        issued_at.elapsed() >= self.ttl
    }

    fn prune(&self, issued: &mut VecDeque<(Uuid, Instant)>) {
        while issued.front().is_some_and(|(_, at)| self.is_expired(*at)) {
            issued.pop_front();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<(Uuid, Instant)>> {
        self.issued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
