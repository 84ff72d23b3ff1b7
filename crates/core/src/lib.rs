//! Core types shared by every SmokeSpot crate
//!
//! - **Domain model**: smoking areas, photos and facility flags as stored remotely
//! - **Submissions**: user-entered drafts and their local validation
//! - **Error handling**: error codes, context and recovery suggestions
//! - **Configuration**: TOML-based settings with validation
//!
//! # Example
//!
//! ```
//! use smokespot_core::{AreaDraft, Facility};
//! use smokespot_geo::Coordinate;
//!
//! let draft = AreaDraft::new("Riverside bench", "Yonghe District")
//!     .with_coordinate(Coordinate::new(25.012, 121.5064))
//!     .with_facility(Facility::Covered);
//!
//! assert!(draft.validate().is_ok());
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod area;
pub mod config;
pub mod draft;
pub mod error;
pub mod facilities;

pub use area::{format_distance, rank_areas, Area, NewArea, NewPhoto, Photo, UserId};
pub use draft::{AreaDraft, ValidDraft, ValidationError};
pub use error::{Error, ErrorCode, Result, ResultExt};
pub use facilities::{Facilities, Facility};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::area::{rank_areas, Area, Photo, UserId};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::draft::{AreaDraft, ValidationError};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::facilities::{Facilities, Facility};
    pub use smokespot_geo::Coordinate;
}
