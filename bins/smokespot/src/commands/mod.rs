//! CLI command implementations

pub mod add;
pub mod auth;
pub mod geocode;
pub mod map;
pub mod show;

use crate::output::{OutputFormat, Status};
use anyhow::{Context as _, Result};
use serde::Serialize;
use smokespot_api_client::{AreaRepository, AuthService, ClientConfig, Session, SessionStore, SupabaseClient};
use smokespot_core::config::Config;
use smokespot_core::{format_distance, Area, Facility};
use smokespot_geo::Coordinate;
use smokespot_location::{LocationResolver, NominatimGeocoder, Resolution, StaticDevice};

/// Resolver used by the CLI: a fixed device position and Nominatim
pub type Resolver = LocationResolver<StaticDevice, NominatimGeocoder>;

/// Everything a command needs, built once in `main`
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
    /// Position reported as the device fix; `None` behaves as denied access
    pub at: Option<Coordinate>,
}

impl Context {
    /// Location resolver from the `[location]` and `[geocoder]` settings
    pub fn resolver(&self) -> Result<Resolver> {
        let geocoder = NominatimGeocoder::new(&self.config.schema.geocoder)
            .context("Failed to build geocoder client")?;
        Ok(LocationResolver::from_config(
            StaticDevice::new(self.at),
            geocoder,
            &self.config.schema.location,
        ))
    }

    /// Shared Supabase client from the environment
    pub fn supabase(&self) -> Result<SupabaseClient> {
        let config = ClientConfig::from_env().context("Supabase is not configured")?;
        SupabaseClient::with_config(config).context("Failed to build Supabase client")
    }

    /// Persisted session location
    pub fn session_store(&self) -> Result<SessionStore> {
        Ok(SessionStore::default_location()?)
    }
}

/// Repository and auth service sharing one client
pub struct Backend {
    pub repository: AreaRepository<SupabaseClient>,
    pub auth: AuthService,
    pub store: SessionStore,
}

impl Backend {
    pub fn connect(ctx: &Context) -> Result<Self> {
        let client = ctx.supabase()?;
        Ok(Self {
            repository: AreaRepository::new(client.clone()),
            auth: AuthService::new(client),
            store: ctx.session_store()?,
        })
    }

    /// Stored session, refreshed if needed and made active
    pub async fn session(&self) -> Result<Option<Session>> {
        Ok(self.auth.restore(&self.store).await?)
    }
}

/// Tell the user the fallback location is in use
pub fn report_fallback(resolution: &Resolution, format: OutputFormat) {
    if let Some(reason) = resolution.fallback_reason() {
        tracing::info!(%reason, "Using fallback location");
        if !format.is_json() {
            Status::warning(reason.advisory());
        }
    }
}

/// JSON shape of an area in command output
#[derive(Debug, Serialize)]
pub struct AreaView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub address: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub facilities: Vec<&'static str>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub photos: Vec<&'a str>,
}

impl<'a> From<&'a Area> for AreaView<'a> {
    fn from(area: &'a Area) -> Self {
        Self {
            id: &area.id,
            name: &area.name,
            address: &area.address,
            latitude: area.coordinate.latitude,
            longitude: area.coordinate.longitude,
            description: area.description(),
            facilities: area.facilities.enabled().map(Facility::key).collect(),
            is_verified: area.is_verified,
            distance_km: area.distance,
            photos: area.photos.iter().map(|p| p.photo_url.as_str()).collect(),
        }
    }
}

/// `"6.2 km away"`, or empty when the distance is unknown
pub fn distance_label(area: &Area) -> String {
    area.distance.map(format_distance).unwrap_or_default()
}

/// Comma-separated facility labels
pub fn facility_labels(area: &Area) -> String {
    area.facilities
        .enabled()
        .map(Facility::label)
        .collect::<Vec<_>>()
        .join(", ")
}
