//! PostgREST access to the smoking area tables
//!
//! Maps to two tables:
//! - `smoking_areas`: one row per place, photos embedded on select
//! - `smoking_area_photos`: photo references keyed by `smoking_area_id`

use crate::client::{SupabaseClient, RETURN_REPRESENTATION};
use crate::error::{ApiError, ApiResult};
use smokespot_core::{Area, NewArea, NewPhoto, Photo};
use std::future::Future;

/// Table holding the areas
pub const AREAS_TABLE: &str = "smoking_areas";

/// Table holding photo references
pub const PHOTOS_TABLE: &str = "smoking_area_photos";

/// Remote store collaborator of the area repository
///
/// Each call is a single round trip; implementations do not retry.
pub trait DataApi: Send + Sync {
    /// All areas, each with its photos embedded
    fn select_areas(&self) -> impl Future<Output = ApiResult<Vec<Area>>> + Send;

    /// Photos attached to one area
    fn select_area_photos(&self, area_id: &str) -> impl Future<Output = ApiResult<Vec<Photo>>> + Send;

    /// Insert an area and return the stored row
    fn insert_area(&self, area: &NewArea) -> impl Future<Output = ApiResult<Area>> + Send;

    /// Insert a photo reference and return the stored row
    fn insert_photo(&self, photo: &NewPhoto) -> impl Future<Output = ApiResult<Photo>> + Send;
}

/// Inserts ask for every column of the stored row back
const INSERT_QUERY: &[(&str, &str)] = &[("select", "*")];

/// Every area with its photo rows embedded
fn areas_query() -> [(&'static str, String); 1] {
    [("select", format!("*,{PHOTOS_TABLE}(*)"))]
}

/// Photo rows of one area, oldest first
fn area_photos_query(area_id: &str) -> [(&'static str, String); 3] {
    [
        ("select", "*".to_string()),
        ("smoking_area_id", format!("eq.{area_id}")),
        ("order", "created_at.asc".to_string()),
    ]
}

impl DataApi for SupabaseClient {
    async fn select_areas(&self) -> ApiResult<Vec<Area>> {
        self.get(&self.table_url(AREAS_TABLE), &areas_query()).await
    }

    async fn select_area_photos(&self, area_id: &str) -> ApiResult<Vec<Photo>> {
        self.get(&self.table_url(PHOTOS_TABLE), &area_photos_query(area_id))
            .await
    }

    async fn insert_area(&self, area: &NewArea) -> ApiResult<Area> {
        let rows: Vec<Area> = self
            .post(&self.table_url(AREAS_TABLE), INSERT_QUERY, area, Some(RETURN_REPRESENTATION))
            .await?;
        first_row(rows, AREAS_TABLE)
    }

    async fn insert_photo(&self, photo: &NewPhoto) -> ApiResult<Photo> {
        let rows: Vec<Photo> = self
            .post(&self.table_url(PHOTOS_TABLE), INSERT_QUERY, photo, Some(RETURN_REPRESENTATION))
            .await?;
        first_row(rows, PHOTOS_TABLE)
    }
}

/// PostgREST answers inserts with an array of the stored rows.
fn first_row<T>(rows: Vec<T>, table: &str) -> ApiResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| ApiError::EmptyResponse(table.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use reqwest::{Method, Request};
    use smokespot_core::UserId;

    fn client() -> SupabaseClient {
        SupabaseClient::with_config(ClientConfig::new("https://abc.supabase.co", "anon-key")).unwrap()
    }

    fn query_pairs(request: &Request) -> Vec<(String, String)> {
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_select_areas_embeds_photos() {
        let client = client();
        let request = client
            .build_request(
                Method::GET,
                &client.table_url(AREAS_TABLE),
                &areas_query(),
                Option::<&()>::None,
                None,
                "req-1",
            )
            .build()
            .unwrap();

        assert_eq!(request.url().path(), "/rest/v1/smoking_areas");
        assert_eq!(query_pairs(&request), pairs(&[("select", "*,smoking_area_photos(*)")]));
    }

    #[test]
    fn test_select_area_photos_filters_by_area() {
        let client = client();
        let request = client
            .build_request(
                Method::GET,
                &client.table_url(PHOTOS_TABLE),
                &area_photos_query("a1"),
                Option::<&()>::None,
                None,
                "req-1",
            )
            .build()
            .unwrap();

        assert_eq!(request.url().path(), "/rest/v1/smoking_area_photos");
        assert_eq!(
            query_pairs(&request),
            pairs(&[("select", "*"), ("smoking_area_id", "eq.a1"), ("order", "created_at.asc")])
        );
    }

    #[test]
    fn test_insert_asks_for_the_stored_row() {
        let client = client();
        let photo = NewPhoto {
            smoking_area_id: "a1".into(),
            photo_url: "file:///tmp/bench.jpg".into(),
            uploaded_by: UserId::new("user-1"),
        };
        let request = client
            .build_request(
                Method::POST,
                &client.table_url(PHOTOS_TABLE),
                INSERT_QUERY,
                Some(&photo),
                Some(RETURN_REPRESENTATION),
                "req-1",
            )
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.headers()["Prefer"], "return=representation");
        assert_eq!(query_pairs(&request), pairs(&[("select", "*")]));

        let body = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        let sent: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(sent["smoking_area_id"], "a1");
        assert_eq!(sent["uploaded_by"], "user-1");
    }

    #[test]
    fn test_first_row() {
        assert_eq!(first_row(vec![1, 2], AREAS_TABLE).unwrap(), 1);

        let err = first_row(Vec::<u8>::new(), PHOTOS_TABLE).unwrap_err();
        assert!(matches!(err, ApiError::EmptyResponse(ref t) if t == PHOTOS_TABLE));
    }

    #[test]
    fn test_insert_response_decodes_into_area() {
        let body = r#"[{
            "id": "a1",
            "name": "Rooftop",
            "address": "Yonghe",
            "latitude": 25.012,
            "longitude": 121.5064,
            "description": "",
            "facilities": {"covered": true},
            "created_by": "user-1",
            "created_at": "2024-05-01T10:00:00+00:00",
            "updated_at": "2024-05-01T10:00:00+00:00",
            "is_verified": false
        }]"#;
        let rows: Vec<Area> = serde_json::from_str(body).unwrap();
        let area = first_row(rows, AREAS_TABLE).unwrap();
        assert_eq!(area.id, "a1");
        assert!(area.photos.is_empty());
    }
}
