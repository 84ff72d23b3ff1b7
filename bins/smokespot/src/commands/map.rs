//! Nearby smoking areas, closest first

use super::{distance_label, report_fallback, AreaView, Backend, Context};
use crate::output::{format_count, format_duration, print_json, Status};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use smokespot_core::Area;
use smokespot_geo::{calculate_distances_within_radius, Coordinate};
use smokespot_telemetry::Timer;

#[derive(Serialize)]
struct MapOutput<'a> {
    latitude: f64,
    longitude: f64,
    fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    advisory: Option<&'static str>,
    areas: Vec<AreaView<'a>>,
}

/// Keep areas within `radius_km` of `origin`, then at most `limit` of them.
///
/// Areas with an invalid coordinate never pass a radius filter.
fn select_nearby(
    origin: &Coordinate,
    areas: Vec<Area>,
    radius_km: Option<f64>,
    limit: Option<usize>,
) -> Vec<Area> {
    let nearby = match radius_km {
        Some(radius) => {
            let within = calculate_distances_within_radius(origin, &areas, radius);
            let mut slots: Vec<Option<Area>> = areas.into_iter().map(Some).collect();
            within.iter().filter_map(|r| slots[r.index].take()).collect()
        }
        None => areas,
    };
    nearby.into_iter().take(limit.unwrap_or(usize::MAX)).collect()
}

pub async fn run(ctx: &Context, limit: Option<usize>, radius_km: Option<f64>) -> Result<()> {
    let resolver = ctx.resolver()?;
    let backend = Backend::connect(ctx)?;

    let resolution = resolver.resolve_current().await;
    report_fallback(&resolution, ctx.format);
    let origin = resolution.coordinate();

    let timer = Timer::start("list_areas_near");
    let ranked = backend.repository.list_areas_near(&origin, None).await;
    let elapsed = timer.stop();
    let areas = select_nearby(&origin, ranked, radius_km, limit);

    if ctx.format.is_json() {
        return print_json(&MapOutput {
            latitude: origin.latitude,
            longitude: origin.longitude,
            fallback: resolution.is_fallback(),
            advisory: resolution.fallback_reason().map(|r| r.advisory()),
            areas: areas.iter().map(AreaView::from).collect(),
        });
    }

    Status::header(&format!("Smoking areas near {origin}"));
    if areas.is_empty() {
        Status::info("No smoking areas found");
        return Ok(());
    }

    for area in &areas {
        let verified = if area.is_verified { " ✓" } else { "" };
        println!(
            "  {}{}  {}",
            area.name.bold(),
            verified.green(),
            distance_label(area).dimmed()
        );
        println!("    {} {}", area.address, format!("[{}]", area.id).dimmed());
    }
    println!();
    println!(
        "  {}",
        format!(
            "{} in {}",
            format_count(areas.len(), "area", "areas"),
            format_duration(elapsed)
        )
        .dimmed()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const ORIGIN: Coordinate = Coordinate::new(25.012, 121.5064);

    fn area(id: &str, coordinate: Coordinate) -> Area {
        Area {
            id: id.into(),
            name: id.into(),
            address: String::new(),
            coordinate,
            description: None,
            facilities: Default::default(),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_verified: false,
            photos: Vec::new(),
            distance: None,
        }
        .with_distance_from(&ORIGIN)
    }

    fn areas() -> Vec<Area> {
        vec![
            area("a", Coordinate::new(25.0125, 121.5064)),
            area("b", Coordinate::new(25.04, 121.5064)),
            area("c", Coordinate::new(95.0, 121.5064)),
        ]
    }

    fn ids(areas: &[Area]) -> Vec<&str> {
        areas.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_select_nearby_radius() {
        assert_eq!(ids(&select_nearby(&ORIGIN, areas(), Some(1.0), None)), vec!["a"]);
        assert_eq!(ids(&select_nearby(&ORIGIN, areas(), Some(5.0), None)), vec!["a", "b"]);
    }

    #[test]
    fn test_select_nearby_radius_keeps_distances() {
        let selected = select_nearby(&ORIGIN, areas(), Some(5.0), Some(1));
        assert_eq!(ids(&selected), vec!["a"]);
        assert!(selected[0].distance.is_some_and(|d| d < 0.1));
    }

    #[test]
    fn test_select_nearby_limit() {
        assert_eq!(ids(&select_nearby(&ORIGIN, areas(), None, Some(2))), vec!["a", "b"]);
        assert_eq!(ids(&select_nearby(&ORIGIN, areas(), None, None)), vec!["a", "b", "c"]);
    }
}
