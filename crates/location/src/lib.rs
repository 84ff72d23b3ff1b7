//! Location resolution for SmokeSpot
//!
//! Acquires the viewer's position and converts between address text and
//! coordinates. Every failure degrades to one configured fallback coordinate,
//! reported as [`Resolution::Fallback`] with a [`FallbackReason`], so callers
//! never block on the location subsystem.
//!
//! # Example
//!
//! ```rust,no_run
//! use smokespot_location::{FallbackConfig, LocationResolver, NoGeocoder, StaticDevice};
//!
//! # async fn demo() {
//! let resolver = LocationResolver::new(StaticDevice::denied(), NoGeocoder, FallbackConfig::default());
//!
//! let resolution = resolver.resolve_current().await;
//! if let Some(reason) = resolution.fallback_reason() {
//!     eprintln!("{}", reason.advisory());
//! }
//! println!("centre map on {}", resolution.coordinate());
//! # }
//! ```

#![warn(clippy::all)]

pub mod device;
pub mod error;
pub mod geocoder;
pub mod nominatim;
pub mod resolver;

pub use device::{Accuracy, DeviceLocation, Permission, StaticDevice};
pub use error::{LocationError, LocationResult};
pub use geocoder::{AddressComponents, Geocoder, NoGeocoder};
pub use nominatim::NominatimGeocoder;
pub use resolver::{FallbackConfig, FallbackReason, LocationResolver, Resolution, ResolutionState};
