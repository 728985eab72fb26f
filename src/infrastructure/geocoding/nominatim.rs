//! Nominatim reverse-geocoding client.
//!
//! Calls `GET {base_url}/reverse?format=json&lat=..&lon=..` and uses the
//! `display_name` of the response as the spot address.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{AddressResolver, DomainError, DomainResult};

/// Public OpenStreetMap Nominatim endpoint
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Reverse-geocoding response. Only `display_name` is used.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    error: Option<String>,
}

/// Nominatim client using a reusable `reqwest::Client`.
pub struct NominatimResolver {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimResolver {
    /// Create a client for `base_url`.
    ///
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> DomainResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| DomainError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn reverse_url(&self) -> String {
        format!("{}/reverse", self.base_url)
    }
}

/// Extract the address from a reverse-geocoding response body.
fn parse_reverse(body: &[u8], latitude: f64, longitude: f64) -> DomainResult<String> {
    let response: ReverseResponse = serde_json::from_slice(body)
        .map_err(|e| DomainError::Network(format!("failed to parse geocoder response: {}", e)))?;

    if let Some(error) = response.error {
        debug!(error = %error, latitude, longitude, "Geocoder reported no result");
    }

    response
        .display_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| DomainError::address_not_found(latitude, longitude))
}

#[async_trait]
impl AddressResolver for NominatimResolver {
    async fn resolve(&self, latitude: f64, longitude: f64) -> DomainResult<String> {
        let response = self
            .http
            .get(self.reverse_url())
            .query(&[
                ("format", "json".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Network(format!(
                "geocoder returned HTTP {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?;

        parse_reverse(&body, latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_name() {
        let body = br#"{
            "place_id": 88066702,
            "lat": "48.8566",
            "lon": "2.3522",
            "display_name": "Hotel de Ville, Place de l'Hotel de Ville, Paris, France"
        }"#;

        let address = parse_reverse(body, 48.8566, 2.3522).unwrap();
        assert_eq!(
            address,
            "Hotel de Ville, Place de l'Hotel de Ville, Paris, France"
        );
    }

    #[test]
    fn unable_to_geocode_is_not_found() {
        let body = br#"{"error": "Unable to geocode"}"#;
        let err = parse_reverse(body, 0.0, -30.0).unwrap_err();
        assert_eq!(err, DomainError::address_not_found(0.0, -30.0));
    }

    #[test]
    fn blank_display_name_is_not_found() {
        let body = br#"{"display_name": "  "}"#;
        assert!(matches!(
            parse_reverse(body, 1.0, 1.0),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn malformed_body_is_network_error() {
        let err = parse_reverse(b"<html>rate limited</html>", 1.0, 1.0).unwrap_err();
        assert!(matches!(err, DomainError::Network(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let resolver = NominatimResolver::new(
            "http://localhost:8080/",
            "parkspot-tests",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(resolver.reverse_url(), "http://localhost:8080/reverse");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Port 9 (discard) on loopback is not expected to speak HTTP
        let resolver = NominatimResolver::new(
            "http://127.0.0.1:9",
            "parkspot-tests",
            Duration::from_millis(500),
        )
        .unwrap();

        let err = resolver.resolve(48.8566, 2.3522).await.unwrap_err();
        assert!(matches!(err, DomainError::Network(_)));
    }
}
