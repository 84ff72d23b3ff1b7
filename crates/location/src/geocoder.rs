//! Geocoding capability: address text <-> coordinates

use crate::error::LocationResult;
use serde::{Deserialize, Serialize};
use smokespot_geo::Coordinate;
use std::future::Future;

/// Address parts a reverse lookup may return; any of them can be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponents {
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl AddressComponents {
    /// Join the non-empty parts with a single space: street, city, region,
    /// country.
    ///
    /// ```
    /// use smokespot_location::AddressComponents;
    ///
    /// let address = AddressComponents {
    ///     street: Some("Xiulang Rd".into()),
    ///     city: None,
    ///     region: Some(" New Taipei ".into()),
    ///     country: Some("Taiwan".into()),
    /// };
    /// assert_eq!(address.compose(), "Xiulang Rd New Taipei Taiwan");
    /// ```
    pub fn compose(&self) -> String {
        [&self.street, &self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Forward and reverse geocoding service.
pub trait Geocoder: Send + Sync {
    /// Candidate addresses for a coordinate, best first. Empty when nothing matched.
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = LocationResult<Vec<AddressComponents>>> + Send;

    /// Candidate coordinates for free-text address, best first. Empty when nothing matched.
    fn forward_geocode(&self, address: &str) -> impl Future<Output = LocationResult<Vec<Coordinate>>> + Send;
}

/// Geocoder that never matches anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

impl Geocoder for NoGeocoder {
    async fn reverse_geocode(&self, _coordinate: Coordinate) -> LocationResult<Vec<AddressComponents>> {
        Ok(Vec::new())
    }

    async fn forward_geocode(&self, _address: &str) -> LocationResult<Vec<Coordinate>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_all_parts() {
        let address = AddressComponents {
            street: Some("Lane 96".into()),
            city: Some("Yonghe".into()),
            region: Some("New Taipei".into()),
            country: Some("Taiwan".into()),
        };
        assert_eq!(address.compose(), "Lane 96 Yonghe New Taipei Taiwan");
    }

    #[test]
    fn test_compose_skips_blank_parts() {
        let address = AddressComponents {
            street: Some("   ".into()),
            city: Some("Yonghe".into()),
            region: None,
            country: Some("".into()),
        };
        assert_eq!(address.compose(), "Yonghe");
        assert_eq!(AddressComponents::default().compose(), "");
    }

    #[test]
    fn test_no_geocoder_matches_nothing() {
        let geocoder = NoGeocoder;
        let reverse = tokio_test::block_on(geocoder.reverse_geocode(Coordinate::new(0.0, 0.0))).unwrap();
        let forward = tokio_test::block_on(geocoder.forward_geocode("Taipei")).unwrap();
        assert!(reverse.is_empty());
        assert!(forward.is_empty());
    }
}
