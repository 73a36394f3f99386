use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProcessingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    Antarctica,
    Asia,
    Europe,
    #[serde(rename = "North America")]
    NorthAmerica,
    Oceania,
    #[serde(rename = "South America")]
    SouthAmerica,
    Unknown,
}

impl Continent {
    pub const ALL: [Continent; 8] = [
        Continent::Africa,
        Continent::Antarctica,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::Oceania,
        Continent::SouthAmerica,
        Continent::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Antarctica => "Antarctica",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::Oceania => "Oceania",
            Continent::SouthAmerica => "South America",
            Continent::Unknown => "Unknown",
        }
    }

    /// Two-letter continent code (AF, AN, AS, EU, NA, OC, SA).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "AF" => Some(Continent::Africa),
            "AN" => Some(Continent::Antarctica),
            "AS" => Some(Continent::Asia),
            "EU" => Some(Continent::Europe),
            "NA" => Some(Continent::NorthAmerica),
            "OC" => Some(Continent::Oceania),
            "SA" => Some(Continent::SouthAmerica),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Continent::Unknown)
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Continent {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Continent::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .or_else(|| Continent::from_code(wanted))
            .ok_or_else(|| ProcessingError::InvalidFilter(format!("unknown continent '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continent_parse_names_and_codes() {
        assert_eq!("North America".parse::<Continent>().unwrap(), Continent::NorthAmerica);
        assert_eq!("asia".parse::<Continent>().unwrap(), Continent::Asia);
        assert_eq!("SA".parse::<Continent>().unwrap(), Continent::SouthAmerica);
        assert_eq!("Unknown".parse::<Continent>().unwrap(), Continent::Unknown);
        assert!("Atlantis".parse::<Continent>().is_err());
    }

    #[test]
    fn test_continent_display_round_trip() {
        for continent in Continent::ALL {
            assert_eq!(continent.to_string().parse::<Continent>().unwrap(), continent);
        }
    }

    #[test]
    fn test_continent_serializes_with_spaces() {
        let json = serde_json::to_string(&Continent::SouthAmerica).unwrap();
        assert_eq!(json, "\"South America\"");
    }
}
