use axum::{
    Form, Json, Router,
    extract::{Query, RawQuery, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use log::{info, warn};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::admin::{ClearGuard, Viewer, admin_flag, is_admin};
use crate::chart::{ChartKind, ChartSpec};
use crate::config::Config;
use crate::dashboard::{CookieChange, Dashboard, DashboardState, Event, Status, View};
use crate::downloader;
use crate::regions::RegionDirectory;
use crate::response::ResponseForm;
use crate::session::{SESSION_COOKIE, SUBMITTED_COOKIE, SessionDirectory, SubmissionState};
use crate::store::{self, ResponseStore, StoreError};
use crate::views::{PageContext, render_page};

/// Process-wide state shared by every handler
pub struct AppState {
    pub config: Config,
    pub dashboard: Dashboard,
    pub sessions: SessionDirectory,
}

impl AppState {
    /// Wire a store into a dashboard using the settings in `config`
    pub fn new(config: Config, store: Arc<dyn ResponseStore>) -> Self {
        let regions = Arc::new(RegionDirectory::load(config.regions_file.as_deref()));
        let dashboard = Dashboard::new(
            store,
            Arc::new(ClearGuard::with_ttl(config.cookie_max_age)),
            regions,
            config.local_region.clone(),
            config.page_size,
        );

        AppState {
            config,
            dashboard,
            sessions: SessionDirectory::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Staff access required")]
    Forbidden,

    #[error("Check in to see the results")]
    NotCheckedIn,

    #[error("Could not read responses: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotCheckedIn => StatusCode::FORBIDDEN,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

#[derive(Deserialize)]
struct ChartQuery {
    chart: Option<String>,
    page: Option<String>,
}

#[derive(Deserialize)]
struct ClearForm {
    #[serde(default)]
    token: String,
}

#[derive(Deserialize)]
struct UnlockForm {
    #[serde(default)]
    code: String,
}

/// What one request knows about its viewer
struct RequestContext {
    submission: SubmissionState,
    admin: bool,
    admin_requested: bool,
    signed_in: bool,
}

impl RequestContext {
    fn from_request(state: &AppState, jar: &CookieJar, raw_query: Option<&str>) -> Self {
        let raw_query = raw_query.unwrap_or("");
        let viewer: Viewer = state
            .sessions
            .viewer(jar.get(SESSION_COOKIE).map(|c| c.value()));

        RequestContext {
            submission: SubmissionState::from_cookie(jar.get(SUBMITTED_COOKIE).map(|c| c.value())),
            admin: is_admin(&state.config.admin_policy, raw_query, &viewer),
            admin_requested: admin_flag(raw_query),
            signed_in: viewer.identity.is_some(),
        }
    }

    fn seed(&self) -> DashboardState {
        DashboardState::seed(self.submission, self.admin)
    }
}

/// Build the router
///
/// Kept separate from [`run`] so tests can drive it without a socket.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/submit", post(handle_submit))
        .route("/admin/clear", post(handle_clear))
        .route("/admin/unlock", post(handle_unlock))
        .route("/admin/download", get(handle_download))
        .route("/api/chart", get(get_chart_data))
        .route("/login", get(handle_login))
        .route("/logout", get(handle_logout))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = store::open(&config)?;
    let address = config.address();
    let app = router(Arc::new(AppState::new(config, store)));

    let listener = TcpListener::bind(&address).await?;
    info!("Listening on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    RawQuery(raw_query): RawQuery,
    Query(query): Query<ChartQuery>,
) -> Html<String> {
    let ctx = RequestContext::from_request(&state, &jar, raw_query.as_deref());
    let outcome = state
        .dashboard
        .dispatch_all(&ctx.seed(), chart_events(&query));
    let dashboard = finish_render(&state, outcome.state).await;

    render(&state, &ctx, &dashboard)
}

async fn handle_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    RawQuery(raw_query): RawQuery,
    Form(form): Form<ResponseForm>,
) -> (CookieJar, Html<String>) {
    let ctx = RequestContext::from_request(&state, &jar, raw_query.as_deref());
    let outcome = state.dashboard.dispatch(&ctx.seed(), Event::Submit(form));
    let jar = apply_cookies(&state.config, jar, &outcome.cookies);
    let dashboard = finish_render(&state, outcome.state).await;
    let page = render(&state, &ctx, &dashboard);
    (jar, page)
}

async fn handle_clear(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    RawQuery(raw_query): RawQuery,
    Form(form): Form<ClearForm>,
) -> (StatusCode, CookieJar, Html<String>) {
    let ctx = RequestContext::from_request(&state, &jar, raw_query.as_deref());
    if !ctx.admin {
        warn!("Rejected clear request from a non-admin viewer");
    }

    let token = Uuid::parse_str(form.token.trim()).ok();
    let outcome = state.dashboard.dispatch(&ctx.seed(), Event::AdminClear(token));
    let status = if ctx.admin {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };

    let jar = apply_cookies(&state.config, jar, &outcome.cookies);
    let page = render(&state, &ctx, &outcome.state);
    (status, jar, page)
}

async fn handle_unlock(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    RawQuery(raw_query): RawQuery,
    Form(form): Form<UnlockForm>,
) -> Response {
    if state.config.admin_policy.verify_code(&form.code) {
        let session_id = state
            .sessions
            .mark_secret_verified(jar.get(SESSION_COOKIE).map(|c| c.value()));
        info!("Staff code accepted");

        let cookie = session_cookie(&state.config, session_id);
        return (jar.add(cookie), Redirect::to("/?admin=true")).into_response();
    }

    warn!("Rejected staff code");
    let ctx = RequestContext::from_request(&state, &jar, raw_query.as_deref());
    let mut dashboard = ctx.seed();
    dashboard.status = Some(Status::Error("That staff code is not correct".to_string()));
    (StatusCode::UNAUTHORIZED, render(&state, &ctx, &dashboard)).into_response()
}

async fn handle_download(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    RawQuery(raw_query): RawQuery,
) -> Result<Response, AppError> {
    let ctx = RequestContext::from_request(&state, &jar, raw_query.as_deref());
    if !ctx.admin {
        warn!("Rejected download request from a non-admin viewer");
        return Err(AppError::Forbidden);
    }

    let responses = state.dashboard.store().scan_all()?;
    info!("Exporting {} responses", responses.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", downloader::EXPORT_FILENAME),
            ),
        ],
        downloader::to_csv(&responses),
    )
        .into_response())
}

/// The aggregation behind a chart as JSON
async fn get_chart_data(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    RawQuery(raw_query): RawQuery,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartSpec>, AppError> {
    let ctx = RequestContext::from_request(&state, &jar, raw_query.as_deref());
    if !ctx.submission.is_submitted() && !ctx.admin {
        return Err(AppError::NotCheckedIn);
    }

    let seed = DashboardState::seed(SubmissionState::Submitted, ctx.admin);
    let outcome = state.dashboard.dispatch_all(&seed, chart_events(&query));
    if outcome.state.status.as_ref().is_some_and(Status::is_error) {
        return Err(AppError::Forbidden);
    }

    Ok(Json(state.dashboard.chart(&outcome.state)))
}

async fn handle_login(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::to(&state.config.login_url)
}

async fn handle_logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove_session(cookie.value());
    }
    let removal = Cookie::build(SESSION_COOKIE).path("/");
    (jar.remove(removal), Redirect::to("/"))
}

/// Events implied by the chart query parameters
fn chart_events(query: &ChartQuery) -> Vec<Event> {
    let mut events = Vec::new();
    if let Some(token) = query.chart.as_deref() {
        events.push(Event::SelectChart(ChartKind::from_token_or_default(Some(token))));
    }
    if let Some(page) = query.page.as_deref().and_then(|p| p.trim().parse::<usize>().ok()) {
        events.push(Event::ChangePage(page));
    }
    events
}

/// Hold the loading indicator for the configured delay, then clear it
async fn finish_render(state: &AppState, dashboard: DashboardState) -> DashboardState {
    if !dashboard.loading {
        return dashboard;
    }
    if !state.config.render_delay.is_zero() {
        tokio::time::sleep(state.config.render_delay).await;
    }
    state.dashboard.dispatch(&dashboard, Event::ChartRendered).state
}

fn render(state: &AppState, ctx: &RequestContext, dashboard: &DashboardState) -> Html<String> {
    let chart = match dashboard.view {
        View::Results => Some(state.dashboard.chart(dashboard)),
        View::Form => None,
    };
    let clear_token = dashboard.admin.then(|| state.dashboard.guard().issue());

    Html(render_page(&PageContext {
        state: dashboard,
        chart: chart.as_ref(),
        regions: state.dashboard.regions(),
        admin_requested: ctx.admin_requested,
        clear_token,
        secret_policy: state.config.admin_policy.uses_secret(),
        signed_in: ctx.signed_in,
    }))
}

fn apply_cookies(config: &Config, jar: CookieJar, changes: &[CookieChange]) -> CookieJar {
    changes.iter().fold(jar, |jar, change| match change {
        CookieChange::SetSubmitted => jar.add(
            Cookie::build((SUBMITTED_COOKIE, "true"))
                .path("/")
                .max_age(max_age(config))
                .same_site(SameSite::Lax),
        ),
        CookieChange::ClearSubmitted => jar.remove(Cookie::build(SUBMITTED_COOKIE).path("/")),
    })
}

fn session_cookie(config: &Config, session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .max_age(max_age(config))
        .same_site(SameSite::Lax)
        .build()
}

fn max_age(config: &Config) -> time::Duration {
    time::Duration::seconds(config.cookie_max_age.as_secs() as i64)
}
