use crate::binning::AgeRange;
use crate::regions::RegionDirectory;
use crate::response::Response;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Message shown whenever a chart has nothing to draw
pub const NO_DATA: &str = "No data available";

/// The fixed set of aggregate views
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Locality,
    AgeDistribution,
    ChristianStatus,
    FaithDecision,
    GeographicMap,
    RawData,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Locality,
        ChartKind::AgeDistribution,
        ChartKind::ChristianStatus,
        ChartKind::FaithDecision,
        ChartKind::GeographicMap,
        ChartKind::RawData,
    ];

    /// Token used in URLs
    pub fn token(self) -> &'static str {
        match self {
            ChartKind::Locality => "locality",
            ChartKind::AgeDistribution => "age",
            ChartKind::ChristianStatus => "christian",
            ChartKind::FaithDecision => "faith",
            ChartKind::GeographicMap => "map",
            ChartKind::RawData => "data",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Locality => "Local vs. Visitors",
            ChartKind::AgeDistribution => "Age Distribution",
            ChartKind::ChristianStatus => "Christ Followers",
            ChartKind::FaithDecision => "Faith Decisions",
            ChartKind::GeographicMap => "Where Attendees Are From",
            ChartKind::RawData => "All Responses",
        }
    }

    /// Only staff may look at individual rows
    pub fn is_admin_only(self) -> bool {
        matches!(self, ChartKind::RawData)
    }

    /// Parse a token, falling back to the default view for anything unknown
    pub fn from_token_or_default(token: Option<&str>) -> Self {
        token.and_then(|t| t.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.token() == token)
            .ok_or_else(|| format!("Unknown chart: {}", s))
    }
}

/// One labelled count
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub label: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub code: String,
    pub name: String,
    pub count: usize,
}

/// One page of raw rows
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TablePage {
    pub rows: Vec<Response>,
    /// 1-based
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

/// Aggregation result for one chart request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSpec {
    Pie { title: String, slices: Vec<Slice> },
    Bar { title: String, bars: Vec<Slice> },
    Choropleth { title: String, regions: Vec<RegionCount> },
    Table { title: String, table: TablePage },
    NoData { title: String, message: String },
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Pie { title, .. }
            | ChartSpec::Bar { title, .. }
            | ChartSpec::Choropleth { title, .. }
            | ChartSpec::Table { title, .. }
            | ChartSpec::NoData { title, .. } => title,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChartSpec::NoData { .. })
    }
}

/// Aggregate the responses for one chart
///
/// # Arguments
/// * `kind` - Requested chart
/// * `responses` - Full store scan
/// * `page` - 1-based page for the raw table, clamped into range
/// * `page_size` - Rows per table page
/// * `regions` - Country name → code lookup for the map
///
/// # Returns
/// * `ChartSpec` - Never fails; an empty input gives `ChartSpec::NoData`
pub fn render_chart(
    kind: ChartKind,
    responses: &[Response],
    page: usize,
    page_size: usize,
    regions: &RegionDirectory,
) -> ChartSpec {
    let title = kind.title().to_string();
    if responses.is_empty() {
        return no_data(title, NO_DATA);
    }

    match kind {
        ChartKind::Locality => ChartSpec::Pie {
            title,
            slices: count_by(responses, |r| locality_label(r.local).to_string()),
        },
        ChartKind::AgeDistribution => {
            let mut bars = Vec::new();
            for range in AgeRange::ALL {
                let count = responses.iter().filter(|r| r.age_range == range).count();
                if count > 0 {
                    bars.push(Slice {
                        label: range.label().to_string(),
                        count,
                    });
                }
            }
            ChartSpec::Bar { title, bars }
        }
        ChartKind::ChristianStatus => ChartSpec::Pie {
            title,
            slices: count_by(responses, |r| r.christian.to_string()),
        },
        ChartKind::FaithDecision => ChartSpec::Pie {
            title,
            slices: count_by(responses, |r| r.faith_decision.to_string()),
        },
        ChartKind::GeographicMap => {
            let mut counts: Vec<RegionCount> = Vec::new();
            for response in responses {
                let Some(code) = regions.country_code(&response.country) else {
                    continue;
                };
                match counts.iter_mut().find(|c| c.code == code) {
                    Some(existing) => existing.count += 1,
                    None => counts.push(RegionCount {
                        code: code.to_string(),
                        name: response.country.trim().to_string(),
                        count: 1,
                    }),
                }
            }
            if counts.is_empty() {
                no_data(title, "No mappable locations yet")
            } else {
                ChartSpec::Choropleth {
                    title,
                    regions: counts,
                }
            }
        }
        ChartKind::RawData => ChartSpec::Table {
            title,
            table: paginate(responses, page, page_size),
        },
    }
}

pub fn locality_label(local: bool) -> &'static str {
    if local { "Local" } else { "Visitor" }
}

/// Count occurrences per label, in order of first appearance
fn count_by<F>(responses: &[Response], label: F) -> Vec<Slice>
where
    F: Fn(&Response) -> String,
{
    let mut slices: Vec<Slice> = Vec::new();
    for response in responses {
        let key = label(response);
        match slices.iter_mut().find(|s| s.label == key) {
            Some(slice) => slice.count += 1,
            None => slices.push(Slice {
                label: key,
                count: 1,
            }),
        }
    }
    slices
}

fn paginate(responses: &[Response], page: usize, page_size: usize) -> TablePage {
    let page_size = page_size.max(1);
    let total = responses.len();
    let page_count = total.div_ceil(page_size).max(1);
    let page = page.clamp(1, page_count);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);

    TablePage {
        rows: responses[start..end].to_vec(),
        page,
        page_count,
        total,
    }
}

fn no_data(title: String, message: &str) -> ChartSpec {
    ChartSpec::NoData {
        title,
        message: message.to_string(),
    }
}
