use crate::binning::{AgeRange, bin_age};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Column names shared by the CSV backend, the SQLite table and the export
pub const COLUMNS: [&str; 9] = [
    "name",
    "ageRange",
    "age",
    "local",
    "country",
    "state",
    "christFollower",
    "faithDecision",
    "howYouFoundUs",
];

/// Yes/No answer to one of the faith questions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn as_str(self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Answer::Yes),
            "no" => Ok(Answer::No),
            other => Err(format!("Expected Yes or No, got '{}'", other)),
        }
    }
}

/// One attendee submission
///
/// Rows are created on submit and never updated. The age range is always
/// derived from the raw age.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub name: String,
    pub age_range: AgeRange,
    pub age: Option<i64>,
    /// True when the attendee is from the configured local region
    pub local: bool,
    pub country: String,
    pub state: Option<String>,
    pub christian: Answer,
    pub faith_decision: Answer,
    pub how_found_us: Option<String>,
}

impl Response {
    /// Render the row as storage fields, in [`COLUMNS`] order
    pub fn to_fields(&self) -> [String; 9] {
        [
            self.name.clone(),
            self.age_range.label().to_string(),
            self.age.map(|a| a.to_string()).unwrap_or_default(),
            self.local.to_string(),
            self.country.clone(),
            self.state.clone().unwrap_or_default(),
            self.christian.as_str().to_string(),
            self.faith_decision.as_str().to_string(),
            self.how_found_us.clone().unwrap_or_default(),
        ]
    }

    /// Rebuild a row from storage fields
    ///
    /// The age range column is trusted only when the raw age is missing;
    /// otherwise it is re-derived so a hand-edited file cannot disagree with
    /// itself.
    pub fn from_fields(fields: &[String]) -> Result<Self, String> {
        if fields.len() != COLUMNS.len() {
            return Err(format!(
                "Expected {} columns, found {}",
                COLUMNS.len(),
                fields.len()
            ));
        }

        let age = match fields[2].trim() {
            "" => None,
            raw => Some(
                raw.parse::<i64>()
                    .map_err(|_| format!("Invalid age '{}'", raw))?,
            ),
        };
        let age_range = match age {
            Some(a) => bin_age(a),
            None => fields[1].parse()?,
        };
        let local = match fields[3].trim() {
            "true" | "True" | "1" => true,
            "false" | "False" | "0" | "" => false,
            other => return Err(format!("Invalid locality flag '{}'", other)),
        };

        Ok(Response {
            name: fields[0].clone(),
            age_range,
            age,
            local,
            country: fields[4].clone(),
            state: non_blank(&fields[5]),
            christian: fields[6].parse()?,
            faith_decision: fields[7].parse()?,
            how_found_us: non_blank(&fields[8]),
        })
    }
}

/// Raw form fields as typed by the attendee
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub christian: String,
    #[serde(default)]
    pub faith: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub how_found_us: String,
}

/// Batched validation failure listing every missing field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please fill in the following fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl ResponseForm {
    /// Check every required field and build the response
    ///
    /// All failures are collected into one error instead of stopping at the
    /// first missing field.
    ///
    /// # Arguments
    /// * `local_region` - State/province name that marks an attendee as local
    pub fn validate(&self, local_region: &str) -> Result<Response, ValidationError> {
        let mut missing = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            missing.push("Name");
        }

        let age = match self.age.trim() {
            "" => {
                missing.push("Age");
                None
            }
            raw => match raw.parse::<i64>() {
                Ok(age) => Some(age),
                Err(_) => {
                    missing.push("Age (whole number)");
                    None
                }
            },
        };

        let christian = self.christian.parse::<Answer>().ok();
        if christian.is_none() {
            missing.push("Christian");
        }

        let faith_decision = self.faith.parse::<Answer>().ok();
        if faith_decision.is_none() {
            missing.push("Faith decision");
        }

        match (age, christian, faith_decision) {
            (Some(age), Some(christian), Some(faith_decision)) if missing.is_empty() => {
                let state = non_blank(&self.state);
                let local = state
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(local_region.trim()));

                Ok(Response {
                    name: name.to_string(),
                    age_range: bin_age(age),
                    age: Some(age),
                    local,
                    country: self.country.trim().to_string(),
                    state,
                    christian,
                    faith_decision,
                    how_found_us: non_blank(&self.how_found_us),
                })
            }
            _ => Err(ValidationError { missing }),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
