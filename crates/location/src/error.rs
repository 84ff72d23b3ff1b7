//! Errors reported by location and geocoding collaborators
//!
//! None of these reach the caller of the resolver: they are folded into a
//! fallback coordinate and kept only as the fallback's reason.

use thiserror::Error;

/// Result type alias for collaborator calls
pub type LocationResult<T> = Result<T, LocationError>;

/// Failure of a device-location or geocoding call
#[derive(Error, Debug)]
pub enum LocationError {
    /// The device could not produce a position fix
    #[error("position unavailable: {0}")]
    Unavailable(String),

    /// The geocoding service failed at the transport level
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The geocoding service answered with a non-success status
    #[error("geocoding service returned {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The geocoding service answered with something unparseable
    #[error("invalid geocoding response: {0}")]
    InvalidResponse(String),
}

impl LocationError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
