//! HTTP geocoder for Nominatim-compatible services
//!
//! Maps `/search` and `/reverse` (jsonv2) onto the [`Geocoder`] trait.

use crate::error::{LocationError, LocationResult};
use crate::geocoder::{AddressComponents, Geocoder};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use smokespot_core::config::GeocoderConfig;
use smokespot_geo::Coordinate;
use tracing::{debug, instrument};

/// Maximum number of forward candidates requested per lookup
const SEARCH_LIMIT: &str = "5";

/// Nominatim client
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    inner: Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Build a client from configuration
    pub fn new(config: &GeocoderConfig) -> LocationResult<Self> {
        let inner = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str, query: &[(&str, String)]) -> LocationResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .inner
            .get(&url)
            .query(&[("format", "jsonv2")])
            .query(query)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| LocationError::InvalidResponse(e.to_string()))
            }
            status => Err(LocationError::Status { status: status.as_u16() }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

impl SearchHit {
    fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.parse().ok()?;
        let lon = self.lon.parse().ok()?;
        Coordinate::try_new(lat, lon).ok()
    }
}

#[derive(Debug, Deserialize)]
struct ReverseHit {
    #[serde(default)]
    address: Option<NominatimAddress>,
    /// Set instead of `address` when nothing is found
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    suburb: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

impl From<NominatimAddress> for AddressComponents {
    fn from(a: NominatimAddress) -> Self {
        let street = match (a.house_number, a.road) {
            (Some(number), Some(road)) => Some(format!("{number} {road}")),
            (None, road) => road,
            (number, None) => number,
        };

        AddressComponents {
            street,
            city: a.city.or(a.town).or(a.village).or(a.suburb),
            region: a.state.or(a.county),
            country: a.country,
        }
    }
}

impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn reverse_geocode(&self, coordinate: Coordinate) -> LocationResult<Vec<AddressComponents>> {
        let query = [
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("addressdetails", "1".to_string()),
        ];

        let hit: ReverseHit = match self.get("reverse", &query).await {
            Err(LocationError::Status { status }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Ok(Vec::new());
            }
            other => other?,
        };

        if let Some(reason) = hit.error {
            debug!(%reason, "Reverse lookup found nothing");
            return Ok(Vec::new());
        }

        Ok(hit.address.map(AddressComponents::from).into_iter().collect())
    }

    #[instrument(skip(self))]
    async fn forward_geocode(&self, address: &str) -> LocationResult<Vec<Coordinate>> {
        let query = [("q", address.to_string()), ("limit", SEARCH_LIMIT.to_string())];
        let hits: Vec<SearchHit> = self.get("search", &query).await?;

        debug!(matches = hits.len(), "Forward lookup finished");
        Ok(hits.iter().filter_map(SearchHit::coordinate).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_hit_parsing() {
        let hits: Vec<SearchHit> = serde_json::from_str(
            r#"[
                {"lat": "25.0120", "lon": "121.5064", "display_name": "Yonghe"},
                {"lat": "oops", "lon": "121.5"},
                {"lat": "95.0", "lon": "0.0"}
            ]"#,
        )
        .unwrap();

        let coords: Vec<_> = hits.iter().filter_map(SearchHit::coordinate).collect();
        assert_eq!(coords, vec![Coordinate::new(25.012, 121.5064)]);
    }

    #[test]
    fn test_reverse_hit_mapping() {
        let hit: ReverseHit = serde_json::from_str(
            r#"{
                "display_name": "...",
                "address": {
                    "house_number": "2",
                    "road": "Xiulang Road",
                    "suburb": "Yonghe District",
                    "state": "New Taipei",
                    "country": "Taiwan",
                    "postcode": "234"
                }
            }"#,
        )
        .unwrap();

        let components: AddressComponents = hit.address.unwrap().into();
        assert_eq!(components.compose(), "2 Xiulang Road Yonghe District New Taipei Taiwan");
    }

    #[test]
    fn test_reverse_hit_error() {
        let hit: ReverseHit = serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert!(hit.address.is_none());
        assert_eq!(hit.error.as_deref(), Some("Unable to geocode"));
    }

    #[test]
    fn test_client_creation() {
        let geocoder = NominatimGeocoder::new(&GeocoderConfig::default()).unwrap();
        assert!(geocoder.base_url.starts_with("https://"));
    }
}
