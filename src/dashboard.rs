//! Event → reducer core of the dashboard
//!
//! Every user interaction becomes one [`Event`]. [`reduce`] is the only place
//! state changes: it returns the next state plus the side effects to run.
//! [`Dashboard::dispatch`] runs those effects against the store in order and,
//! if one fails, reduces an [`Event::EffectFailed`] against the state the
//! event started from. Nothing else writes to the page state, so two
//! triggers touching the same output are resolved purely by event order.

use crate::admin::{ClearGuard, Redemption};
use crate::chart::{ChartKind, ChartSpec, locality_label, render_chart};
use crate::regions::RegionDirectory;
use crate::response::{Response, ResponseForm};
use crate::session::SubmissionState;
use crate::store::ResponseStore;
use log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

const EXPIRED_CLEAR: &str = "This clear button has expired. Reload and try again.";

/// Which top-level view the page shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Form,
    Results,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(text) | Status::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

/// Everything one render of the page depends on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardState {
    pub view: View,
    pub submission: SubmissionState,
    pub chart: ChartKind,
    /// 1-based page of the raw table
    pub page: usize,
    pub loading: bool,
    pub admin: bool,
    /// Values shown in the form fields
    pub form: ResponseForm,
    pub status: Option<Status>,
}

impl DashboardState {
    /// Initial state for a request
    ///
    /// The submission cookie only seeds the view here; afterwards the state
    /// machine owns it.
    pub fn seed(submission: SubmissionState, admin: bool) -> Self {
        DashboardState {
            view: if submission.is_submitted() {
                View::Results
            } else {
                View::Form
            },
            submission,
            chart: ChartKind::default(),
            page: 1,
            loading: false,
            admin,
            form: ResponseForm::default(),
            status: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Submit(ResponseForm),
    SelectChart(ChartKind),
    ChangePage(usize),
    ChartRendered,
    /// Clear-all click with the idempotency token rendered into the button
    AdminClear(Option<Uuid>),
    EffectFailed(Failure),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    /// Saving a submission failed; carries the values to put back in the form
    Persist(ResponseForm),
    Clear(String),
    /// The clear token was unknown or already spent
    DuplicateClear,
    ExpiredClear,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Persist(Response),
    SetSubmittedCookie,
    ClearStore(Uuid),
    ClearSubmittedCookie,
}

/// Cookie update the HTTP layer must apply to the response
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CookieChange {
    SetSubmitted,
    ClearSubmitted,
}

/// Result of reducing one event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub state: DashboardState,
    pub effects: Vec<Effect>,
}

impl Step {
    fn unchanged(state: &DashboardState) -> Self {
        Step {
            state: state.clone(),
            effects: Vec::new(),
        }
    }

    fn with_status(state: &DashboardState, status: Status) -> Self {
        let mut next = state.clone();
        next.status = Some(status);
        Step {
            state: next,
            effects: Vec::new(),
        }
    }
}

/// Apply one event to the state
///
/// Pure: no I/O, the effects describe what the caller has to perform.
///
/// # Arguments
/// * `state` - State before the event
/// * `event` - The interaction
/// * `local_region` - State/province that marks a submission as local
pub fn reduce(state: &DashboardState, event: &Event, local_region: &str) -> Step {
    match event {
        Event::Submit(form) => {
            if state.view == View::Results || state.submission.is_submitted() {
                return Step::with_status(
                    state,
                    Status::Info("You have already checked in. Thank you!".to_string()),
                );
            }

            match form.validate(local_region) {
                Ok(response) => {
                    let mut next = state.clone();
                    next.view = View::Results;
                    next.submission = SubmissionState::Submitted;
                    next.chart = ChartKind::default();
                    next.page = 1;
                    next.loading = true;
                    next.form = ResponseForm::default();
                    next.status = Some(Status::Info(format!(
                        "Thanks for checking in, {}!",
                        response.name
                    )));
                    Step {
                        state: next,
                        effects: vec![Effect::Persist(response), Effect::SetSubmittedCookie],
                    }
                }
                Err(e) => {
                    let mut next = state.clone();
                    next.form = form.clone();
                    next.status = Some(Status::Error(e.to_string()));
                    Step {
                        state: next,
                        effects: Vec::new(),
                    }
                }
            }
        }

        Event::SelectChart(kind) => {
            if state.view != View::Results {
                return Step::unchanged(state);
            }
            if kind.is_admin_only() && !state.admin {
                return Step::with_status(
                    state,
                    Status::Error("Raw responses are only available to staff".to_string()),
                );
            }
            let mut next = state.clone();
            next.chart = *kind;
            next.page = 1;
            next.loading = true;
            Step {
                state: next,
                effects: Vec::new(),
            }
        }

        Event::ChangePage(page) => {
            if state.view != View::Results || state.chart != ChartKind::RawData {
                return Step::unchanged(state);
            }
            let mut next = state.clone();
            next.page = (*page).max(1);
            next.loading = true;
            Step {
                state: next,
                effects: Vec::new(),
            }
        }

        Event::ChartRendered => {
            let mut next = state.clone();
            next.loading = false;
            Step {
                state: next,
                effects: Vec::new(),
            }
        }

        Event::AdminClear(token) => {
            if !state.admin {
                return Step::with_status(
                    state,
                    Status::Error("Only staff can clear responses".to_string()),
                );
            }
            let Some(token) = token else {
                return Step::with_status(
                    state,
                    Status::Error(EXPIRED_CLEAR.to_string()),
                );
            };

            let mut next = state.clone();
            next.view = View::Form;
            next.submission = SubmissionState::NotSubmitted;
            next.chart = ChartKind::default();
            next.page = 1;
            next.loading = false;
            next.form = ResponseForm::default();
            next.status = Some(Status::Info("All responses have been cleared".to_string()));
            Step {
                state: next,
                effects: vec![Effect::ClearStore(*token), Effect::ClearSubmittedCookie],
            }
        }

        Event::EffectFailed(failure) => {
            let mut next = state.clone();
            next.loading = false;
            next.status = Some(match failure {
                Failure::Persist(form) => {
                    next.form = form.clone();
                    Status::Error("Could not save your response. Please try again.".to_string())
                }
                Failure::Clear(reason) => {
                    Status::Error(format!("Could not clear responses: {}", reason))
                }
                Failure::DuplicateClear => {
                    Status::Info("Responses were already cleared".to_string())
                }
                Failure::ExpiredClear => Status::Error(EXPIRED_CLEAR.to_string()),
            });
            Step {
                state: next,
                effects: Vec::new(),
            }
        }
    }
}

/// Result of dispatching one event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub state: DashboardState,
    pub cookies: Vec<CookieChange>,
}

/// Runs reducer effects against the shared store
#[derive(Clone)]
pub struct Dashboard {
    store: Arc<dyn ResponseStore>,
    guard: Arc<ClearGuard>,
    regions: Arc<RegionDirectory>,
    local_region: String,
    page_size: usize,
}

impl Dashboard {
    pub fn new(
        store: Arc<dyn ResponseStore>,
        guard: Arc<ClearGuard>,
        regions: Arc<RegionDirectory>,
        local_region: impl Into<String>,
        page_size: usize,
    ) -> Self {
        Dashboard {
            store,
            guard,
            regions,
            local_region: local_region.into(),
            page_size: page_size.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn ResponseStore> {
        &self.store
    }

    pub fn guard(&self) -> &Arc<ClearGuard> {
        &self.guard
    }

    pub fn regions(&self) -> &RegionDirectory {
        &self.regions
    }

    /// Reduce one event and perform its effects
    ///
    /// Effects run in order. The first failure stops the rest and the
    /// failure is reduced against `state`, so a failed save never marks the
    /// visitor as submitted and a failed clear never resets the cookie.
    pub fn dispatch(&self, state: &DashboardState, event: Event) -> Outcome {
        let step = reduce(state, &event, &self.local_region);
        let mut cookies = Vec::new();

        for effect in &step.effects {
            if let Err(failure) = self.apply(effect, &event, &mut cookies) {
                let recovered = reduce(state, &Event::EffectFailed(failure), &self.local_region);
                return Outcome {
                    state: recovered.state,
                    cookies: Vec::new(),
                };
            }
        }

        Outcome {
            state: step.state,
            cookies,
        }
    }

    /// Dispatch a sequence of events, threading the state through
    pub fn dispatch_all(
        &self,
        state: &DashboardState,
        events: impl IntoIterator<Item = Event>,
    ) -> Outcome {
        let mut outcome = Outcome {
            state: state.clone(),
            cookies: Vec::new(),
        };
        for event in events {
            let next = self.dispatch(&outcome.state, event);
            outcome.state = next.state;
            outcome.cookies.extend(next.cookies);
        }
        outcome
    }

    /// Build the chart for the current state from a fresh store scan
    pub fn chart(&self, state: &DashboardState) -> ChartSpec {
        match self.store.scan_all() {
            Ok(responses) => render_chart(
                state.chart,
                &responses,
                state.page,
                self.page_size,
                &self.regions,
            ),
            Err(e) => {
                error!("Failed to read responses for chart {}: {}", state.chart, e);
                ChartSpec::NoData {
                    title: state.chart.title().to_string(),
                    message: "Responses are unavailable right now".to_string(),
                }
            }
        }
    }

    fn apply(
        &self,
        effect: &Effect,
        event: &Event,
        cookies: &mut Vec<CookieChange>,
    ) -> Result<(), Failure> {
        match effect {
            Effect::Persist(response) => {
                self.store.insert(response).map_err(|e| {
                    error!("Failed to save response: {}", e);
                    let form = match event {
                        Event::Submit(form) => form.clone(),
                        _ => ResponseForm::default(),
                    };
                    Failure::Persist(form)
                })?;
                info!("Recorded check-in ({}, {})", response.age_range, locality_label(response.local));
                Ok(())
            }
            Effect::ClearStore(token) => match self.guard.redeem(token, || self.store.delete_all()) {
                Redemption::Completed => {
                    info!("All responses cleared");
                    Ok(())
                }
                Redemption::Failed(e) => {
                    error!("Failed to clear responses: {}", e);
                    Err(Failure::Clear(e.to_string()))
                }
                Redemption::Unknown => {
                    warn!("Ignoring clear request with spent or unknown token {}", token);
                    Err(Failure::DuplicateClear)
                }
                Redemption::Expired => {
                    warn!("Ignoring clear request with expired token {}", token);
                    Err(Failure::ExpiredClear)
                }
            },
            Effect::SetSubmittedCookie => {
                cookies.push(CookieChange::SetSubmitted);
                Ok(())
            }
            Effect::ClearSubmittedCookie => {
                cookies.push(CookieChange::ClearSubmitted);
                Ok(())
            }
        }
    }
}
