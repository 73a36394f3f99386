//! Best-effort detection of the user's country, used only to pre-select filters.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::Continent;
use crate::utils::geography::lookup_country;

#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("Geolocation is disabled")]
    Disabled,

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Response from {0} did not name a country")]
    MissingCountry(String),

    #[error("Unrecognized country '{0}'")]
    UnknownCountry(String),
}

/// Anything that can tell which country the user is in.
pub trait CountryLocator {
    /// Country as an ISO alpha-2 code or a name.
    fn locate(&self) -> Result<String, GeolocationError>;
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    country: Option<String>,
}

/// Looks the caller up through an ipinfo-style JSON endpoint.
pub struct IpInfoLocator {
    endpoint: String,
    timeout: Duration,
}

impl IpInfoLocator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl CountryLocator for IpInfoLocator {
    fn locate(&self) -> Result<String, GeolocationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| GeolocationError::NetworkRequest(self.endpoint.clone(), e))?;

        let response = client
            .get(&self.endpoint)
            .send()
            .map_err(|e| GeolocationError::NetworkRequest(self.endpoint.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeolocationError::HttpStatus {
                url: self.endpoint.clone(),
                status,
            });
        }

        let body: IpInfoResponse = response
            .json()
            .map_err(|e| GeolocationError::NetworkRequest(self.endpoint.clone(), e))?;

        body.country
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| GeolocationError::MissingCountry(self.endpoint.clone()))
    }
}

/// A locator with a preset answer; `None` behaves like an unreachable service.
pub struct FixedLocator(pub Option<String>);

impl CountryLocator for FixedLocator {
    fn locate(&self) -> Result<String, GeolocationError> {
        self.0.clone().ok_or(GeolocationError::Disabled)
    }
}

/// Country and continent to pre-select when the user has chosen nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSelection {
    pub country: String,
    pub continent: Continent,
}

impl DefaultSelection {
    pub fn new(country: impl Into<String>, continent: Continent) -> Self {
        Self {
            country: country.into(),
            continent,
        }
    }

    fn from_located(located: &str) -> Result<Self, GeolocationError> {
        lookup_country(located)
            .map(|entry| Self::new(entry.name, entry.continent))
            .ok_or_else(|| GeolocationError::UnknownCountry(located.to_string()))
    }
}

/// Ask `locator` for the user's country, falling back to `fallback` on any failure.
///
/// Failures are logged at debug level and never reach the caller.
pub fn detect_default_selection(
    locator: &dyn CountryLocator,
    fallback: &DefaultSelection,
) -> DefaultSelection {
    match locator
        .locate()
        .and_then(|located| DefaultSelection::from_located(&located))
    {
        Ok(selection) => {
            debug!(
                "Detected default selection {} / {}",
                selection.country, selection.continent
            );
            selection
        }
        Err(e) => {
            debug!("Geolocation unavailable ({}), using {}", e, fallback.country);
            fallback.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> DefaultSelection {
        DefaultSelection::new("India", Continent::Asia)
    }

    #[test]
    fn test_detected_code_resolves_to_country_name() {
        let locator = FixedLocator(Some("FR".to_string()));
        let selection = detect_default_selection(&locator, &fallback());

        assert_eq!(selection, DefaultSelection::new("France", Continent::Europe));
    }

    #[test]
    fn test_failure_falls_back() {
        let selection = detect_default_selection(&FixedLocator(None), &fallback());
        assert_eq!(selection, fallback());
    }

    #[test]
    fn test_unrecognized_country_falls_back() {
        let locator = FixedLocator(Some("XX".to_string()));
        assert_eq!(detect_default_selection(&locator, &fallback()), fallback());
    }

    #[test]
    fn test_unreachable_endpoint_falls_back() {
        // Port 9 (discard) on localhost is closed in test environments.
        let locator = IpInfoLocator::new("http://127.0.0.1:9/json", Duration::from_millis(200));
        assert!(locator.locate().is_err());
        assert_eq!(detect_default_selection(&locator, &fallback()), fallback());
    }
}
