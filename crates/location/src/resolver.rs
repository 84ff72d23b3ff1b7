//! Location resolution with a single fixed fallback
//!
//! Every failure path (permission refused, no fix, geocoder miss) ends at the
//! same configured coordinate. Callers always get something they can put on a
//! map, plus the reason when it is the fallback.

use crate::device::{Accuracy, DeviceLocation, Permission};
use crate::geocoder::Geocoder;
use smokespot_core::config::LocationConfig;
use smokespot_core::ErrorCode;
use smokespot_geo::Coordinate;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// Default upper bound on a single position fix
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(15);

/// The coordinate (and its address text) used whenever live data is missing
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackConfig {
    pub coordinate: Coordinate,
    pub address: String,
}

impl FallbackConfig {
    pub fn new(coordinate: Coordinate, address: impl Into<String>) -> Self {
        Self {
            coordinate,
            address: address.into(),
        }
    }
}

impl From<&LocationConfig> for FallbackConfig {
    fn from(config: &LocationConfig) -> Self {
        Self::new(config.fallback_coordinate(), config.fallback_address.clone())
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self::from(&LocationConfig::default())
    }
}

/// Why the fallback coordinate was handed out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The user refused location access
    PermissionDenied,
    /// Permission was granted but no usable fix arrived
    AcquisitionFailed(String),
    /// The geocoder had no usable match
    GeocodeMiss,
}

impl FallbackReason {
    /// Map to the shared error code table
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PermissionDenied => ErrorCode::LocationPermissionDenied,
            Self::AcquisitionFailed(_) => ErrorCode::AcquisitionFailed,
            Self::GeocodeMiss => ErrorCode::GeocodeMiss,
        }
    }

    /// Short advisory suitable for showing to the user
    pub fn advisory(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Location permission denied. Please enable location services.",
            Self::AcquisitionFailed(_) => "Could not get current location.",
            Self::GeocodeMiss => "Address not found.",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("permission denied"),
            Self::AcquisitionFailed(detail) => write!(f, "acquisition failed: {detail}"),
            Self::GeocodeMiss => f.write_str("no geocoder match"),
        }
    }
}

/// A usable coordinate, tagged with whether it is live or the fallback
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(Coordinate),
    Fallback {
        coordinate: Coordinate,
        reason: FallbackReason,
    },
}

impl Resolution {
    /// The coordinate to use, live or not
    pub fn coordinate(&self) -> Coordinate {
        match self {
            Self::Resolved(coordinate) | Self::Fallback { coordinate, .. } => *coordinate,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Resolved(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Progress of the most recent `resolve_current` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Idle,
    Requesting,
    Resolved,
    Fallback,
}

/// Resolves the viewer's position and converts between addresses and
/// coordinates, degrading to the fallback instead of failing.
pub struct LocationResolver<D, G> {
    device: D,
    geocoder: G,
    fallback: FallbackConfig,
    acquire_timeout: Duration,
    accuracy: Accuracy,
    state: Mutex<ResolutionState>,
}

impl<D: DeviceLocation, G: Geocoder> LocationResolver<D, G> {
    pub fn new(device: D, geocoder: G, fallback: FallbackConfig) -> Self {
        Self {
            device,
            geocoder,
            fallback,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            accuracy: Accuracy::default(),
            state: Mutex::new(ResolutionState::Idle),
        }
    }

    /// Build from the `[location]` configuration section
    pub fn from_config(device: D, geocoder: G, config: &LocationConfig) -> Self {
        let accuracy = if config.high_accuracy { Accuracy::High } else { Accuracy::Balanced };
        Self::new(device, geocoder, FallbackConfig::from(config))
            .with_acquire_timeout(config.acquire_timeout())
            .with_accuracy(accuracy)
    }

    #[must_use]
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn fallback(&self) -> &FallbackConfig {
        &self.fallback
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// State of the latest resolution attempt
    pub fn state(&self) -> ResolutionState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: ResolutionState) {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    fn use_fallback(&self, reason: FallbackReason) -> Resolution {
        warn!(
            reason = %reason,
            fallback = %self.fallback.coordinate,
            "Using fallback coordinate"
        );
        Resolution::Fallback {
            coordinate: self.fallback.coordinate,
            reason,
        }
    }

    /// Current device position, or the fallback with the reason it was used.
    pub async fn resolve_current(&self) -> Resolution {
        self.set_state(ResolutionState::Requesting);

        let resolution = self.acquire().await;

        self.set_state(if resolution.is_fallback() {
            ResolutionState::Fallback
        } else {
            ResolutionState::Resolved
        });
        resolution
    }

    async fn acquire(&self) -> Resolution {
        match self.device.request_permission().await {
            Ok(Permission::Granted) => {}
            Ok(Permission::Denied) => return self.use_fallback(FallbackReason::PermissionDenied),
            Err(e) => return self.use_fallback(FallbackReason::AcquisitionFailed(e.to_string())),
        }

        let fix = tokio::time::timeout(self.acquire_timeout, self.device.current_coordinate(self.accuracy)).await;

        match fix {
            Ok(Ok(coordinate)) if coordinate.is_valid() => {
                debug!(%coordinate, "Device position resolved");
                Resolution::Resolved(coordinate)
            }
            Ok(Ok(coordinate)) => self.use_fallback(FallbackReason::AcquisitionFailed(format!(
                "device reported out-of-range coordinate {coordinate}"
            ))),
            Ok(Err(e)) => self.use_fallback(FallbackReason::AcquisitionFailed(e.to_string())),
            Err(_) => self.use_fallback(FallbackReason::AcquisitionFailed(format!(
                "no fix within {}s",
                self.acquire_timeout.as_secs_f32()
            ))),
        }
    }

    /// Human-readable address for a coordinate; empty when unknown.
    pub async fn reverse_geocode(&self, coordinate: Coordinate) -> String {
        match self.geocoder.reverse_geocode(coordinate).await {
            Ok(candidates) => candidates.first().map(|a| a.compose()).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, %coordinate, "Reverse geocoding failed");
                String::new()
            }
        }
    }

    /// Coordinate for free-text address; the fallback when there is no match.
    pub async fn forward_geocode(&self, address: &str) -> Resolution {
        let address = address.trim();
        if address.is_empty() {
            return self.use_fallback(FallbackReason::GeocodeMiss);
        }

        match self.geocoder.forward_geocode(address).await {
            Ok(candidates) => match candidates.into_iter().find(Coordinate::is_valid) {
                Some(coordinate) => Resolution::Resolved(coordinate),
                None => self.use_fallback(FallbackReason::GeocodeMiss),
            },
            Err(e) => {
                warn!(error = %e, address, "Forward geocoding failed");
                self.use_fallback(FallbackReason::GeocodeMiss)
            }
        }
    }

    /// Device position plus its address text.
    ///
    /// When the fallback coordinate is used, the address is the configured
    /// fallback address so the two always describe the same place.
    pub async fn locate_with_address(&self) -> (Resolution, String) {
        let resolution = self.resolve_current().await;
        let address = match resolution {
            Resolution::Resolved(coordinate) => self.reverse_geocode(coordinate).await,
            Resolution::Fallback { .. } => self.fallback.address.clone(),
        };
        (resolution, address)
    }

    /// The configured fallback address, geocoded.
    pub async fn fallback_place(&self) -> (Resolution, String) {
        let address = self.fallback.address.clone();
        let resolution = self.forward_geocode(&address).await;
        (resolution, address)
    }
}
