//! Smoking areas and their photos, as stored in the remote tables

use crate::facilities::{lenient_blob, Facilities};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smokespot_geo::{calculate_distances_sorted, haversine_distance, Coordinate, Located};
use std::fmt;

/// Opaque identifier handed out by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row of `smoking_area_photos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub smoking_area_id: String,
    pub photo_url: String,
    #[serde(default)]
    pub uploaded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Row of `smoking_areas`, optionally with its photos embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_blob")]
    pub facilities: Facilities,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_verified: bool,
    /// Present only when the select embedded the photo relation
    #[serde(default, rename = "smoking_area_photos", skip_serializing)]
    pub photos: Vec<Photo>,
    /// Kilometres from the viewer; computed locally
    #[serde(skip)]
    pub distance: Option<f64>,
}

impl Area {
    /// Copy of this area annotated with its distance from `origin`.
    #[must_use]
    pub fn with_distance_from(mut self, origin: &Coordinate) -> Self {
        self.distance = Some(haversine_distance(origin, &self.coordinate));
        self
    }

    /// Description with blank text treated as absent
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}

impl Located for Area {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// Annotate every area with its distance from `origin` and order them
/// closest first. Areas with an out-of-range coordinate sort last and keep
/// `distance == None`.
pub fn rank_areas(origin: &Coordinate, areas: Vec<Area>, max_results: Option<usize>) -> Vec<Area> {
    let ranked = calculate_distances_sorted(origin, &areas, max_results);

    let mut slots: Vec<Option<Area>> = areas.into_iter().map(Some).collect();
    ranked
        .into_iter()
        .filter_map(|r| {
            let mut area = slots[r.index].take()?;
            area.distance = r.distance.is_finite().then_some(r.distance);
            Some(area)
        })
        .collect()
}

/// `"6.2 km away"`
pub fn format_distance(km: f64) -> String {
    format!("{km:.1} km away")
}

/// Insert payload for `smoking_areas`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewArea {
    pub name: String,
    pub address: String,
    pub description: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub facilities: Facilities,
    pub created_by: UserId,
}

/// Insert payload for `smoking_area_photos`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPhoto {
    pub smoking_area_id: String,
    pub photo_url: String,
    pub uploaded_by: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facilities::Facility;
    use serde_json::json;

    fn area_json(id: &str, lat: f64, lng: f64) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("Area {id}"),
            "address": "Somewhere",
            "latitude": lat,
            "longitude": lng,
            "description": "",
            "facilities": {"covered": true, "ashtray": false, "wifi": true},
            "created_by": null,
            "created_at": "2024-05-01T10:00:00.123456+00:00",
            "updated_at": "2024-05-01T10:00:00+00:00",
            "is_verified": false
        })
    }

    fn area(id: &str, lat: f64, lng: f64) -> Area {
        serde_json::from_value(area_json(id, lat, lng)).unwrap()
    }

    #[test]
    fn test_area_deserialize() {
        let area = area("a1", 25.012, 121.5064);
        assert_eq!(area.coordinate, Coordinate::new(25.012, 121.5064));
        assert!(area.facilities.has(Facility::Covered));
        assert!(!area.facilities.has(Facility::Ashtray));
        assert!(area.photos.is_empty());
        assert_eq!(area.distance, None);
        assert_eq!(area.description(), None);
    }

    #[test]
    fn test_area_null_facilities() {
        let mut value = area_json("a1", 25.0, 121.0);
        value["facilities"] = serde_json::Value::Null;
        let area: Area = serde_json::from_value(value).unwrap();
        assert_eq!(area.facilities, Facilities::default());
    }

    #[test]
    fn test_bad_facility_flag_keeps_the_list() {
        let mut odd = area_json("a2", 25.0, 121.0);
        odd["facilities"] = json!({"covered": "yes", "seating": true});
        let mut scalar = area_json("a3", 25.1, 121.1);
        scalar["facilities"] = json!("covered");

        let areas: Vec<Area> =
            serde_json::from_value(json!([area_json("a1", 25.012, 121.5064), odd, scalar])).unwrap();

        assert_eq!(areas.len(), 3);
        assert!(areas[0].facilities.has(Facility::Covered));
        assert_eq!(areas[1].facilities.covered, None);
        assert!(areas[1].facilities.has(Facility::Seating));
        assert_eq!(areas[2].facilities, Facilities::default());
    }

    #[test]
    fn test_area_with_embedded_photos() {
        let mut value = area_json("a1", 25.0, 121.0);
        value["smoking_area_photos"] = json!([{
            "id": "p1",
            "smoking_area_id": "a1",
            "photo_url": "file:///photo.jpg",
            "uploaded_by": "user-1",
            "created_at": "2024-05-01T10:05:00+00:00"
        }]);
        let area: Area = serde_json::from_value(value).unwrap();
        assert_eq!(area.photos.len(), 1);
        assert_eq!(area.photos[0].uploaded_by, Some(UserId::new("user-1")));
    }

    #[test]
    fn test_with_distance_from() {
        let area = area("a1", 25.0120, 121.5064).with_distance_from(&Coordinate::new(25.0330, 121.5654));
        let distance = area.distance.unwrap();
        assert!(distance > 6.1 && distance < 6.3);
    }

    #[test]
    fn test_rank_areas() {
        let origin = Coordinate::new(25.0120, 121.5064);
        let areas = vec![
            area("far", 25.0330, 121.5654),
            area("broken", 100.0, 0.0),
            area("here", 25.0120, 121.5064),
        ];

        let ranked = rank_areas(&origin, areas, None);
        let ids: Vec<_> = ranked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["here", "far", "broken"]);
        assert_eq!(ranked[0].distance, Some(0.0));
        assert_eq!(ranked[2].distance, None);

        let top = rank_areas(&origin, ranked, Some(1));
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, "here");
    }

    #[test]
    fn test_new_area_payload() {
        let payload = NewArea {
            name: "Rooftop".into(),
            address: "Yonghe".into(),
            description: String::new(),
            coordinate: Coordinate::new(25.012, 121.5064),
            facilities: Facilities::default().with(Facility::Seating),
            created_by: UserId::new("user-1"),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["latitude"], json!(25.012));
        assert_eq!(value["facilities"], json!({"seating": true}));
        assert_eq!(value["created_by"], json!("user-1"));
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(6.2345), "6.2 km away");
    }
}
