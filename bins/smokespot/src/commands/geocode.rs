//! Address and coordinate lookups

use super::{report_fallback, Context};
use crate::output::{print_json, Status};
use anyhow::Result;
use serde_json::json;
use smokespot_geo::Coordinate;

/// Address text to coordinate; falls back to the default place on a miss
pub async fn forward(ctx: &Context, address: &str) -> Result<()> {
    let resolver = ctx.resolver()?;
    let resolution = resolver.forward_geocode(address).await;
    let coordinate = resolution.coordinate();

    if ctx.format.is_json() {
        return print_json(&json!({
            "address": address,
            "latitude": coordinate.latitude,
            "longitude": coordinate.longitude,
            "fallback": resolution.is_fallback(),
        }));
    }

    report_fallback(&resolution, ctx.format);
    println!("{coordinate}");
    Ok(())
}

/// Coordinate to address text
pub async fn reverse(ctx: &Context, coordinate: Coordinate) -> Result<()> {
    let resolver = ctx.resolver()?;
    let address = resolver.reverse_geocode(coordinate).await;

    if ctx.format.is_json() {
        return print_json(&json!({
            "latitude": coordinate.latitude,
            "longitude": coordinate.longitude,
            "address": address,
        }));
    }

    if address.is_empty() {
        Status::warning("No address found for this location");
    } else {
        println!("{address}");
    }
    Ok(())
}
