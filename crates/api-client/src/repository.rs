//! Area repository: the list, detail and submission flows over [`DataApi`]

use crate::data::DataApi;
use crate::error::ApiError;
use smokespot_core::{rank_areas, Area, AreaDraft, ErrorCode, NewPhoto, Photo, UserId, ValidationError};
use smokespot_geo::Coordinate;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Repository failures
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The draft was rejected locally; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Writes need a signed-in user
    #[error("sign in to submit smoking areas")]
    AuthRequired,

    /// Reading from the remote store failed
    #[error("failed to fetch smoking areas: {0}")]
    Fetch(#[source] ApiError),

    /// Writing to the remote store failed
    #[error("failed to save: {0}")]
    Insert(#[source] ApiError),
}

impl RepositoryError {
    /// Map to the shared error code table
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(e) => e.code(),
            Self::AuthRequired => ErrorCode::AuthRequired,
            Self::Fetch(e) if e.is_unauthorized() => ErrorCode::AuthRequired,
            Self::Insert(e) if e.is_unauthorized() => ErrorCode::AuthRequired,
            Self::Fetch(_) => ErrorCode::FetchError,
            Self::Insert(_) => ErrorCode::InsertError,
        }
    }
}

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Outcome of [`AreaRepository::submit`]
///
/// The area is stored even when the photo upload fails; the failure is kept
/// in `photo_error` so callers can tell the user.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The stored area
    pub area: Area,
    /// The stored photo, if one was attached
    pub photo: Option<Photo>,
    /// Why the photo could not be attached
    pub photo_error: Option<String>,
}

impl Submission {
    /// Whether the photo was requested but not stored
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.photo_error.is_some()
    }
}

/// Smoking area repository
#[derive(Clone)]
pub struct AreaRepository<A> {
    api: A,
}

impl<A: DataApi> AreaRepository<A> {
    /// Wrap a remote store
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// The underlying remote store
    pub fn api(&self) -> &A {
        &self.api
    }

    /// All areas, failing on any remote error
    #[instrument(skip(self))]
    pub async fn fetch_areas(&self) -> RepositoryResult<Vec<Area>> {
        let areas = self.api.select_areas().await.map_err(RepositoryError::Fetch)?;
        debug!(count = areas.len(), "Fetched smoking areas");
        Ok(areas)
    }

    /// All areas, or none when the remote store cannot be reached
    pub async fn list_areas(&self) -> Vec<Area> {
        self.fetch_areas().await.unwrap_or_else(|e| {
            warn!(error = %e, "Showing no smoking areas");
            Vec::new()
        })
    }

    /// Areas ordered by distance from `origin`, closest first
    pub async fn list_areas_near(&self, origin: &Coordinate, max_results: Option<usize>) -> Vec<Area> {
        rank_areas(origin, self.list_areas().await, max_results)
    }

    /// Photos of one area; empty when they cannot be loaded
    pub async fn photos_for(&self, area_id: &str) -> Vec<Photo> {
        match self.api.select_area_photos(area_id).await {
            Ok(photos) => photos,
            Err(e) => {
                warn!(area_id, error = %e, "Failed to load photos");
                Vec::new()
            }
        }
    }

    /// Validate and store a new area attributed to `user`.
    ///
    /// Validation runs before the session check, and neither touches the
    /// network.
    #[instrument(skip(self, draft, user), fields(name = %draft.name))]
    pub async fn create_area(&self, draft: &AreaDraft, user: Option<&UserId>) -> RepositoryResult<Area> {
        let valid = draft.validate()?;
        let user = user.ok_or(RepositoryError::AuthRequired)?;

        let area = self
            .api
            .insert_area(&valid.into_new_area(user))
            .await
            .map_err(RepositoryError::Insert)?;
        info!(id = %area.id, "Created smoking area");
        Ok(area)
    }

    /// Attach a photo reference to an existing area
    #[instrument(skip(self, user))]
    pub async fn attach_photo(
        &self,
        area_id: &str,
        photo_url: &str,
        user: Option<&UserId>,
    ) -> RepositoryResult<Photo> {
        let user = user.ok_or(RepositoryError::AuthRequired)?;

        let photo = NewPhoto {
            smoking_area_id: area_id.to_string(),
            photo_url: photo_url.to_string(),
            uploaded_by: user.clone(),
        };
        self.api
            .insert_photo(&photo)
            .await
            .map_err(RepositoryError::Insert)
    }

    /// Store the area, then its photo if the draft has one.
    ///
    /// A failed photo upload neither fails the submission nor removes the
    /// stored area.
    pub async fn submit(&self, draft: &AreaDraft, user: Option<&UserId>) -> RepositoryResult<Submission> {
        let area = self.create_area(draft, user).await?;

        let mut submission = Submission {
            area,
            photo: None,
            photo_error: None,
        };

        let photo_url = draft.photo.as_deref().map(str::trim).filter(|p| !p.is_empty());
        if let Some(photo_url) = photo_url {
            match self.attach_photo(&submission.area.id, photo_url, user).await {
                Ok(photo) => submission.photo = Some(photo),
                Err(e) => {
                    warn!(area_id = %submission.area.id, error = %e, "Area saved without its photo");
                    submission.photo_error = Some(e.to_string());
                }
            }
        }

        Ok(submission)
    }
}
