//! Supabase access for SmokeSpot
//!
//! This crate talks to the project's PostgREST and GoTrue endpoints and
//! exposes the smoking-area repository on top of them.
//!
//! # Features
//!
//! - **Environment-based configuration**: Load the project URL and anon key from environment variables
//! - **Single-attempt requests**: every call is made once; failures surface to the caller
//! - **Request correlation**: Track requests with unique IDs for debugging
//! - **Shared session**: clones of one client see the signed-in user's token
//!
//! # Example
//!
//! ```rust,no_run
//! use smokespot_api_client::{AreaRepository, SupabaseClient};
//! use smokespot_geo::Coordinate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SupabaseClient::new()?;
//!     let repository = AreaRepository::new(client);
//!
//!     let here = Coordinate::new(25.012, 121.5064);
//!     for area in repository.list_areas_near(&here, Some(5)).await {
//!         println!("{} ({:?} km)", area.name, area.distance);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod repository;

pub use auth::{AuthError, AuthResult, AuthService, AuthUser, Session, SessionStore, SignUpOutcome};
pub use client::SupabaseClient;
pub use config::{ClientConfig, Environment};
pub use data::DataApi;
pub use error::{ApiError, ApiResult};
pub use repository::{AreaRepository, RepositoryError, RepositoryResult, Submission};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::auth::{AuthService, Session, SessionStore};
    pub use crate::client::SupabaseClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::data::DataApi;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::repository::{AreaRepository, RepositoryError, Submission};
}
