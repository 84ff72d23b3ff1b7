//! Configuration loading and schema definitions
//!
//! Settings shared by the location resolver, the geocoder and logging.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
