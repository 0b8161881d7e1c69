use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Age bucket shown on the age-distribution chart
///
/// Variants are declared in ascending order so that sorting a list of
/// buckets yields the natural display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "<18")]
    Under18,
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "25-40")]
    From26To40,
    #[serde(rename = ">40")]
    Over40,
}

impl AgeRange {
    /// Every bucket, youngest first
    pub const ALL: [AgeRange; 4] = [
        AgeRange::Under18,
        AgeRange::From18To25,
        AgeRange::From26To40,
        AgeRange::Over40,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeRange::Under18 => "<18",
            AgeRange::From18To25 => "18-25",
            AgeRange::From26To40 => "25-40",
            AgeRange::Over40 => ">40",
        }
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeRange::ALL
            .into_iter()
            .find(|range| range.label() == s.trim())
            .ok_or_else(|| format!("Unknown age range: {}", s))
    }
}

/// Map a raw age to its bucket
///
/// Total over the integer domain. Negative or implausible ages are not
/// rejected: anything below 18 is `<18` and anything above 40 is `>40`.
///
/// # Examples
/// ```
/// use checkin::binning::{bin_age, AgeRange};
///
/// assert_eq!(bin_age(17), AgeRange::Under18);
/// assert_eq!(bin_age(25).label(), "18-25");
/// assert_eq!(bin_age(26).label(), "25-40");
/// assert_eq!(bin_age(41), AgeRange::Over40);
/// ```
pub fn bin_age(age: i64) -> AgeRange {
    match age {
        i64::MIN..=17 => AgeRange::Under18,
        18..=25 => AgeRange::From18To25,
        26..=40 => AgeRange::From26To40,
        _ => AgeRange::Over40,
    }
}
