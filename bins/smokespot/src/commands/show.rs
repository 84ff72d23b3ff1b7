//! One smoking area in detail

use super::{distance_label, facility_labels, report_fallback, AreaView, Backend, Context};
use crate::output::{print_json, Status};
use anyhow::{anyhow, Result};
use owo_colors::OwoColorize;

pub async fn run(ctx: &Context, id: &str) -> Result<()> {
    let resolver = ctx.resolver()?;
    let backend = Backend::connect(ctx)?;

    let areas = backend.repository.fetch_areas().await?;
    let area = areas
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| anyhow!("No smoking area with id {id}"))?;

    let resolution = resolver.resolve_current().await;
    report_fallback(&resolution, ctx.format);
    let mut area = area.with_distance_from(&resolution.coordinate());

    if area.photos.is_empty() {
        area.photos = backend.repository.photos_for(&area.id).await;
    }

    if ctx.format.is_json() {
        return print_json(&AreaView::from(&area));
    }

    Status::header(&area.name);
    println!("  {:<12} {}", "Address:".dimmed(), area.address);
    println!("  {:<12} {}", "Location:".dimmed(), area.coordinate);
    println!("  {:<12} {}", "Distance:".dimmed(), distance_label(&area));
    if let Some(description) = area.description() {
        println!("  {:<12} {}", "About:".dimmed(), description);
    }

    let facilities = facility_labels(&area);
    println!(
        "  {:<12} {}",
        "Facilities:".dimmed(),
        if facilities.is_empty() { "none listed" } else { facilities.as_str() }
    );
    println!(
        "  {:<12} {}",
        "Verified:".dimmed(),
        if area.is_verified { "yes".green().to_string() } else { "no".to_string() }
    );

    if !area.photos.is_empty() {
        println!("  {}", "Photos:".dimmed());
        for photo in &area.photos {
            println!("    {}", photo.photo_url);
        }
    }

    Ok(())
}
