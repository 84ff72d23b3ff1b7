//! Host device location capability

use crate::error::{LocationError, LocationResult};
use smokespot_geo::Coordinate;
use std::future::Future;

/// Outcome of asking the host for location access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Requested fix quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accuracy {
    #[default]
    Balanced,
    High,
}

/// The platform's positioning service.
pub trait DeviceLocation: Send + Sync {
    /// Ask the user/host for foreground location access.
    fn request_permission(&self) -> impl Future<Output = LocationResult<Permission>> + Send;

    /// Take a single position fix.
    fn current_coordinate(&self, accuracy: Accuracy) -> impl Future<Output = LocationResult<Coordinate>> + Send;
}

/// A device whose position is known up front.
///
/// With no position configured it behaves like a device whose user refused
/// location access.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDevice {
    position: Option<Coordinate>,
}

impl StaticDevice {
    pub fn new(position: Option<Coordinate>) -> Self {
        Self { position }
    }

    pub fn at(position: Coordinate) -> Self {
        Self::new(Some(position))
    }

    pub fn denied() -> Self {
        Self::new(None)
    }
}

impl DeviceLocation for StaticDevice {
    async fn request_permission(&self) -> LocationResult<Permission> {
        Ok(if self.position.is_some() {
            Permission::Granted
        } else {
            Permission::Denied
        })
    }

    async fn current_coordinate(&self, _accuracy: Accuracy) -> LocationResult<Coordinate> {
        self.position
            .ok_or_else(|| LocationError::unavailable("no position configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_device_with_position() {
        let device = StaticDevice::at(Coordinate::new(25.0, 121.0));
        assert_eq!(device.request_permission().await.unwrap(), Permission::Granted);
        assert_eq!(
            device.current_coordinate(Accuracy::High).await.unwrap(),
            Coordinate::new(25.0, 121.0)
        );
    }

    #[tokio::test]
    async fn test_static_device_without_position() {
        let device = StaticDevice::denied();
        assert_eq!(device.request_permission().await.unwrap(), Permission::Denied);
        assert!(device.current_coordinate(Accuracy::Balanced).await.is_err());
    }
}
