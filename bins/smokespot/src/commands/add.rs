//! Submit a new smoking area

use super::{report_fallback, AreaView, Backend, Context};
use crate::output::{print_json, Status};
use anyhow::{bail, Result};
use serde_json::json;
use smokespot_core::{AreaDraft, Facility};
use smokespot_location::Resolution;

/// Where the new area's coordinate comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// The device position, with its address filled in by reverse geocoding
    Here,
    /// Forward-geocode the entered address
    Geocode,
    /// The configured default place
    DefaultLocation,
}

/// Values typed into the submission form
#[derive(Debug, Clone)]
pub struct AddArgs {
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub facilities: Vec<Facility>,
    pub photo: Option<String>,
    pub source: LocationSource,
}

/// Build the draft from the form and the resolved place.
///
/// An entered address wins over the resolved one.
fn build_draft(args: &AddArgs, resolution: &Resolution, resolved_address: String) -> AreaDraft {
    let address = args
        .address
        .clone()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(resolved_address);

    let mut draft = AreaDraft::new(args.name.clone(), address).with_coordinate(resolution.coordinate());
    if let Some(description) = &args.description {
        draft = draft.with_description(description.clone());
    }
    for facility in &args.facilities {
        draft = draft.with_facility(*facility);
    }
    if let Some(photo) = &args.photo {
        draft = draft.with_photo(photo.clone());
    }
    draft
}

pub async fn run(ctx: &Context, args: AddArgs) -> Result<()> {
    let resolver = ctx.resolver()?;
    let backend = Backend::connect(ctx)?;

    let (resolution, resolved_address) = match args.source {
        LocationSource::Here => resolver.locate_with_address().await,
        LocationSource::Geocode => {
            let Some(address) = args.address.as_deref().filter(|a| !a.trim().is_empty()) else {
                bail!("--geocode needs --address");
            };
            (resolver.forward_geocode(address).await, address.to_string())
        }
        LocationSource::DefaultLocation => resolver.fallback_place().await,
    };
    report_fallback(&resolution, ctx.format);

    let draft = build_draft(&args, &resolution, resolved_address);
    let session = backend.session().await?;
    let user = session.as_ref().map(|s| s.user_id());

    let submission = backend.repository.submit(&draft, user).await?;

    if ctx.format.is_json() {
        return print_json(&json!({
            "area": AreaView::from(&submission.area),
            "photo": submission.photo.as_ref().map(|p| p.photo_url.as_str()),
            "photo_error": submission.photo_error,
            "partial": submission.is_partial(),
        }));
    }

    Status::success(&format!(
        "Added {} [{}]",
        submission.area.name, submission.area.id
    ));
    if let Some(error) = &submission.photo_error {
        Status::warning(&format!("The photo could not be attached: {error}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smokespot_geo::Coordinate;

    fn args(address: Option<&str>) -> AddArgs {
        AddArgs {
            name: "Riverside bench".into(),
            address: address.map(String::from),
            description: Some("under the bridge".into()),
            facilities: vec![Facility::Covered, Facility::Seating],
            photo: Some("file:///photo.jpg".into()),
            source: LocationSource::Here,
        }
    }

    #[test]
    fn test_resolved_address_fills_blank_field() {
        let resolution = Resolution::Resolved(Coordinate::new(25.0, 121.0));
        let draft = build_draft(&args(Some("  ")), &resolution, "Yonghe District".into());
        assert_eq!(draft.address, "Yonghe District");
        assert_eq!(draft.coordinate, Some(Coordinate::new(25.0, 121.0)));
        assert!(draft.facilities.has(Facility::Seating));
        assert_eq!(draft.photo.as_deref(), Some("file:///photo.jpg"));
    }

    #[test]
    fn test_entered_address_wins() {
        let resolution = Resolution::Resolved(Coordinate::new(25.0, 121.0));
        let draft = build_draft(&args(Some("Rooftop, Building 3")), &resolution, "Yonghe".into());
        assert_eq!(draft.address, "Rooftop, Building 3");
    }
}
