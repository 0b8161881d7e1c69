//! Country and state lists for the form, and the name → code lookup used by
//! the geographic chart.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    /// ISO 3166-1 alpha-3 for countries, USPS code for states
    pub code: String,
}

#[derive(Debug, Deserialize)]
struct RegionFile {
    countries: Vec<Region>,
    #[serde(default)]
    states: Vec<Region>,
}

const BUILTIN_COUNTRIES: &[(&str, &str)] = &[
    ("United States", "USA"),
    ("Afghanistan", "AFG"),
    ("Argentina", "ARG"),
    ("Australia", "AUS"),
    ("Austria", "AUT"),
    ("Bangladesh", "BGD"),
    ("Belgium", "BEL"),
    ("Bolivia", "BOL"),
    ("Brazil", "BRA"),
    ("Cambodia", "KHM"),
    ("Cameroon", "CMR"),
    ("Canada", "CAN"),
    ("Chile", "CHL"),
    ("China", "CHN"),
    ("Colombia", "COL"),
    ("Costa Rica", "CRI"),
    ("Cuba", "CUB"),
    ("Czechia", "CZE"),
    ("Denmark", "DNK"),
    ("Dominican Republic", "DOM"),
    ("Ecuador", "ECU"),
    ("Egypt", "EGY"),
    ("El Salvador", "SLV"),
    ("Eritrea", "ERI"),
    ("Ethiopia", "ETH"),
    ("Finland", "FIN"),
    ("France", "FRA"),
    ("Germany", "DEU"),
    ("Ghana", "GHA"),
    ("Greece", "GRC"),
    ("Guatemala", "GTM"),
    ("Haiti", "HTI"),
    ("Honduras", "HND"),
    ("Hungary", "HUN"),
    ("India", "IND"),
    ("Indonesia", "IDN"),
    ("Iran", "IRN"),
    ("Iraq", "IRQ"),
    ("Ireland", "IRL"),
    ("Israel", "ISR"),
    ("Italy", "ITA"),
    ("Jamaica", "JAM"),
    ("Japan", "JPN"),
    ("Jordan", "JOR"),
    ("Kenya", "KEN"),
    ("Lebanon", "LBN"),
    ("Liberia", "LBR"),
    ("Malaysia", "MYS"),
    ("Mexico", "MEX"),
    ("Morocco", "MAR"),
    ("Nepal", "NPL"),
    ("Netherlands", "NLD"),
    ("New Zealand", "NZL"),
    ("Nicaragua", "NIC"),
    ("Nigeria", "NGA"),
    ("Norway", "NOR"),
    ("Pakistan", "PAK"),
    ("Panama", "PAN"),
    ("Peru", "PER"),
    ("Philippines", "PHL"),
    ("Poland", "POL"),
    ("Portugal", "PRT"),
    ("Romania", "ROU"),
    ("Russia", "RUS"),
    ("Rwanda", "RWA"),
    ("Saudi Arabia", "SAU"),
    ("Senegal", "SEN"),
    ("Sierra Leone", "SLE"),
    ("Singapore", "SGP"),
    ("Somalia", "SOM"),
    ("South Africa", "ZAF"),
    ("South Korea", "KOR"),
    ("Spain", "ESP"),
    ("Sri Lanka", "LKA"),
    ("Sudan", "SDN"),
    ("Sweden", "SWE"),
    ("Switzerland", "CHE"),
    ("Syria", "SYR"),
    ("Taiwan", "TWN"),
    ("Tanzania", "TZA"),
    ("Thailand", "THA"),
    ("Trinidad and Tobago", "TTO"),
    ("Turkey", "TUR"),
    ("Uganda", "UGA"),
    ("Ukraine", "UKR"),
    ("United Arab Emirates", "ARE"),
    ("United Kingdom", "GBR"),
    ("Uruguay", "URY"),
    ("Venezuela", "VEN"),
    ("Vietnam", "VNM"),
    ("Zambia", "ZMB"),
    ("Zimbabwe", "ZWE"),
];

const BUILTIN_STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

lazy_static! {
    static ref BUILTIN: RegionDirectory = RegionDirectory::from_lists(
        to_regions(BUILTIN_COUNTRIES),
        to_regions(BUILTIN_STATES),
    );
}

/// Lookup tables for countries and US states
#[derive(Clone, Debug)]
pub struct RegionDirectory {
    countries: Vec<Region>,
    states: Vec<Region>,
    country_codes: HashMap<String, String>,
}

impl RegionDirectory {
    /// The compiled-in lists
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load region lists from a JSON file, falling back to the built-in lists
    ///
    /// A missing path means the built-in lists. Read or parse failures are
    /// logged and never fatal.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|data| serde_json::from_str::<RegionFile>(&data).map_err(|e| e.to_string()));

        match parsed {
            Ok(file) if !file.countries.is_empty() => {
                log::info!(
                    "Loaded {} countries and {} states from {}",
                    file.countries.len(),
                    file.states.len(),
                    path.display()
                );
                let states = if file.states.is_empty() {
                    to_regions(BUILTIN_STATES)
                } else {
                    file.states
                };
                Self::from_lists(file.countries, states)
            }
            Ok(_) => {
                log::warn!(
                    "Region file {} has no countries, using built-in list",
                    path.display()
                );
                Self::builtin()
            }
            Err(e) => {
                log::warn!(
                    "Failed to load region file {}: {}, using built-in list",
                    path.display(),
                    e
                );
                Self::builtin()
            }
        }
    }

    pub fn from_lists(countries: Vec<Region>, states: Vec<Region>) -> Self {
        let country_codes = countries
            .iter()
            .map(|c| (c.name.trim().to_lowercase(), c.code.clone()))
            .collect();
        RegionDirectory {
            countries,
            states,
            country_codes,
        }
    }

    pub fn countries(&self) -> &[Region] {
        &self.countries
    }

    pub fn states(&self) -> &[Region] {
        &self.states
    }

    /// ISO-3 code for a country name, matched case-insensitively
    pub fn country_code(&self, name: &str) -> Option<&str> {
        self.country_codes
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }
}

fn to_regions(list: &[(&str, &str)]) -> Vec<Region> {
    list.iter()
        .map(|(name, code)| Region {
            name: name.to_string(),
            code: code.to_string(),
        })
        .collect()
}
