#![cfg(feature = "web")]
//! HTML for the single dashboard page
//!
//! One function per state shape: the form view, the results view and the
//! admin panel. The page shell lives in `static/page.html` and receives the
//! rendered body through string replacement.

use crate::admin::AdminCapabilities;
use crate::chart::{ChartKind, ChartSpec, TablePage};
use crate::dashboard::{DashboardState, View};
use crate::graph::{GraphOptions, render_svg};
use crate::regions::{Region, RegionDirectory};
use crate::response::{COLUMNS, ResponseForm};
use uuid::Uuid;

/// Everything the page needs beyond the reducer state
pub struct PageContext<'a> {
    pub state: &'a DashboardState,
    /// Present in the results view
    pub chart: Option<&'a ChartSpec>,
    pub regions: &'a RegionDirectory,
    /// `admin=true` was in the URL
    pub admin_requested: bool,
    /// Token for the clear button, issued only for admins
    pub clear_token: Option<Uuid>,
    pub secret_policy: bool,
    pub signed_in: bool,
}

/// Render the whole page
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let mut body = String::new();

    if let Some(status) = &ctx.state.status {
        let class = if status.is_error() { "status error" } else { "status info" };
        body.push_str(&format!(
            r#"<div class="{}" role="status">{}</div>"#,
            class,
            escape_html(status.text())
        ));
    }

    match ctx.state.view {
        View::Form => body.push_str(&render_form(&ctx.state.form, ctx.regions, ctx.admin_requested)),
        View::Results => body.push_str(&render_results(ctx)),
    }

    body.push_str(&render_admin_panel(ctx));

    include_str!("./static/page.html")
        .replace("{{title}}", "Easter Check-in")
        .replace("{{body}}", &body)
}

/// The check-in form, pre-filled with `form`
pub fn render_form(form: &ResponseForm, regions: &RegionDirectory, admin_requested: bool) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        r#"<section id="checkin-form"><h2>Welcome! Please check in</h2><form method="post" action="{}">"#,
        with_admin("/submit", admin_requested)
    ));

    html.push_str(&format!(
        r#"<label>Name <input type="text" name="name" value="{}" required></label>"#,
        escape_html(&form.name)
    ));
    html.push_str(&format!(
        r#"<label>Age <input type="number" name="age" value="{}" required></label>"#,
        escape_html(&form.age)
    ));
    html.push_str(&yes_no_select("christian", "Are you a Christ follower?", &form.christian));
    html.push_str(&yes_no_select(
        "faith",
        "Did you make a faith decision today?",
        &form.faith,
    ));
    html.push_str(&region_select("country", "Country", regions.countries(), &form.country, "United States"));
    html.push_str(&region_select("state", "State", regions.states(), &form.state, ""));
    html.push_str(&format!(
        r#"<label>How did you hear about us? <textarea name="how_found_us">{}</textarea></label>"#,
        escape_html(&form.how_found_us)
    ));

    html.push_str(r#"<button type="submit">Submit</button></form></section>"#);
    html
}

/// Chart navigation, loading indicator and the selected chart
pub fn render_results(ctx: &PageContext<'_>) -> String {
    let state = ctx.state;
    let mut html = String::from(r#"<section id="results"><nav class="charts">"#);

    for kind in ChartKind::ALL {
        if kind.is_admin_only() && !state.admin {
            continue;
        }
        let class = if kind == state.chart { "active" } else { "" };
        html.push_str(&format!(
            r#"<a class="{}" data-chart="{}" href="{}">{}</a>"#,
            class,
            kind.token(),
            chart_link(kind, 1, ctx.admin_requested),
            escape_html(kind.title())
        ));
    }
    html.push_str("</nav>");

    html.push_str(&format!(
        r#"<div id="loading" class="loading" data-loading="{}"{}>Loading…</div>"#,
        state.loading,
        if state.loading { "" } else { " hidden" }
    ));

    html.push_str(r#"<div id="chart">"#);
    match ctx.chart {
        Some(spec) => html.push_str(&render_chart_fragment(spec, ctx.admin_requested)),
        None => html.push_str(r#"<p class="no-data">No data available</p>"#),
    }
    html.push_str("</div></section>");
    html
}

/// A chart as inline SVG, a table, or the empty-state message
pub fn render_chart_fragment(spec: &ChartSpec, admin_requested: bool) -> String {
    match spec {
        ChartSpec::NoData { title, message } => format!(
            r#"<h3>{}</h3><p class="no-data">{}</p>"#,
            escape_html(title),
            escape_html(message)
        ),
        ChartSpec::Table { title, table } => format!(
            "<h3>{}</h3>{}",
            escape_html(title),
            render_table(table, admin_requested)
        ),
        _ => match render_svg(spec, &GraphOptions::default()) {
            Ok(Some(svg)) => format!(r#"<figure class="graph">{}</figure>"#, svg),
            Ok(None) => String::new(),
            Err(e) => {
                log::error!("Failed to draw chart '{}': {}", spec.title(), e);
                format!(
                    r#"<h3>{}</h3><p class="no-data">Chart unavailable</p>"#,
                    escape_html(spec.title())
                )
            }
        },
    }
}

fn render_table(table: &TablePage, admin_requested: bool) -> String {
    let mut html = String::from(r#"<table class="responses"><thead><tr>"#);
    for column in COLUMNS {
        html.push_str(&format!("<th>{}</th>", column));
    }
    html.push_str("</tr></thead><tbody>");

    for row in &table.rows {
        html.push_str("<tr>");
        for field in row.to_fields() {
            html.push_str(&format!("<td>{}</td>", escape_html(&field)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");

    html.push_str(&format!(
        r#"<div class="pager"><span>Page {} of {} ({} responses)</span>"#,
        table.page, table.page_count, table.total
    ));
    if table.page > 1 {
        html.push_str(&format!(
            r#" <a href="{}">Previous</a>"#,
            chart_link(ChartKind::RawData, table.page - 1, admin_requested)
        ));
    }
    if table.page < table.page_count {
        html.push_str(&format!(
            r#" <a href="{}">Next</a>"#,
            chart_link(ChartKind::RawData, table.page + 1, admin_requested)
        ));
    }
    html.push_str("</div>");
    html
}

/// Staff controls; empty unless the viewer is an admin or is being asked to sign in
pub fn render_admin_panel(ctx: &PageContext<'_>) -> String {
    let mut html = String::new();
    let capabilities = AdminCapabilities::for_admin(ctx.state.admin);

    if ctx.state.admin {
        html.push_str(r#"<section id="admin-panel"><h2>Staff</h2>"#);
        if capabilities.download {
            html.push_str(&format!(
                r#"<a id="admin-download" href="{}" download="responses.csv">Download responses</a> "#,
                with_admin("/admin/download", ctx.admin_requested)
            ));
        }
        if capabilities.raw_table {
            html.push_str(&format!(
                r#"<a id="admin-raw-table" href="{}">View raw data</a>"#,
                chart_link(ChartKind::RawData, 1, ctx.admin_requested)
            ));
        }
        if let Some(token) = ctx.clear_token.filter(|_| capabilities.clear) {
            html.push_str(&format!(
                r#"<form id="admin-clear" method="post" action="{}" onsubmit="return confirm('Delete every response?');"><input type="hidden" name="token" value="{}"><button type="submit" class="danger">Clear all responses</button></form>"#,
                with_admin("/admin/clear", ctx.admin_requested),
                token
            ));
        }
        if ctx.signed_in {
            html.push_str(r#"<a href="/logout">Sign out</a>"#);
        }
        html.push_str("</section>");
    } else if ctx.admin_requested {
        html.push_str(r#"<section id="admin-login">"#);
        if ctx.secret_policy {
            html.push_str(
                r#"<form method="post" action="/admin/unlock?admin=true"><label>Staff code <input type="password" name="code"></label><button type="submit">Unlock</button></form>"#,
            );
        } else if ctx.signed_in {
            html.push_str(r#"<p>This account is not on the staff list.</p><a href="/logout">Sign out</a>"#);
        } else {
            html.push_str(r#"<a href="/login">Staff sign in</a>"#);
        }
        html.push_str("</section>");
    }

    html
}

/// Link to a chart, keeping the admin flag when it was requested
pub fn chart_link(kind: ChartKind, page: usize, admin_requested: bool) -> String {
    let mut link = format!("/?chart={}", kind.token());
    if kind == ChartKind::RawData && page > 1 {
        link.push_str(&format!("&page={}", page));
    }
    if admin_requested {
        link.push_str("&admin=true");
    }
    link
}

fn with_admin(path: &str, admin_requested: bool) -> String {
    if admin_requested {
        format!("{}?admin=true", path)
    } else {
        path.to_string()
    }
}

fn yes_no_select(name: &str, label: &str, current: &str) -> String {
    let mut html = format!(
        r#"<label>{} <select name="{}" required><option value="">Select</option>"#,
        escape_html(label),
        name
    );
    for option in ["Yes", "No"] {
        let selected = if current.trim().eq_ignore_ascii_case(option) { " selected" } else { "" };
        html.push_str(&format!(r#"<option value="{0}"{1}>{0}</option>"#, option, selected));
    }
    html.push_str("</select></label>");
    html
}

fn region_select(name: &str, label: &str, regions: &[Region], current: &str, fallback: &str) -> String {
    let current = if current.trim().is_empty() { fallback } else { current.trim() };
    let mut html = format!(
        r#"<label>{} <select name="{}"><option value="">N/A</option>"#,
        escape_html(label),
        name
    );
    for region in regions {
        let selected = if region.name.eq_ignore_ascii_case(current) { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape_html(&region.name),
            selected
        ));
    }
    html.push_str("</select></label>");
    html
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
