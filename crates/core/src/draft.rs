//! User-entered submissions and their local validation

use crate::area::{NewArea, UserId};
use crate::error::{Error, ErrorCode};
use crate::facilities::{Facilities, Facility};
use serde::{Deserialize, Serialize};
use smokespot_geo::Coordinate;
use thiserror::Error;

/// Why a draft was rejected before reaching the network
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("location is not set")]
    MissingCoordinate,

    #[error("location {0} is out of range")]
    InvalidCoordinate(String),
}

impl ValidationError {
    /// Map to the shared error code table
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingField(_) | Self::MissingCoordinate => ErrorCode::MissingField,
            Self::InvalidCoordinate(_) => ErrorCode::InvalidCoordinate,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::new(err.code(), err.to_string())
            .with_suggestion("Fill in the name and address and set a location")
    }
}

/// A smoking area as typed into the submission form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaDraft {
    pub name: String,
    pub address: String,
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub facilities: Facilities,
    /// Reference to a picked photo (URI or URL), stored as given
    #[serde(default)]
    pub photo: Option<String>,
}

impl AreaDraft {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_facility(mut self, facility: Facility) -> Self {
        self.facilities.set(facility, true);
        self
    }

    #[must_use]
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    /// Check the required fields and produce trimmed values.
    ///
    /// Name and address must be non-blank; the coordinate must be set and in
    /// range. Nothing here touches the network.
    pub fn validate(&self) -> Result<ValidDraft, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }

        let address = self.address.trim();
        if address.is_empty() {
            return Err(ValidationError::MissingField("address"));
        }

        let coordinate = self.coordinate.ok_or(ValidationError::MissingCoordinate)?;
        if !coordinate.is_valid() {
            return Err(ValidationError::InvalidCoordinate(coordinate.to_string()));
        }

        Ok(ValidDraft {
            name: name.to_string(),
            address: address.to_string(),
            description: self.description.trim().to_string(),
            coordinate,
            facilities: self.facilities,
            photo: self
                .photo
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from),
        })
    }
}

/// A draft that passed [`AreaDraft::validate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub name: String,
    pub address: String,
    pub description: String,
    pub coordinate: Coordinate,
    pub facilities: Facilities,
    pub photo: Option<String>,
}

impl ValidDraft {
    /// Insert payload attributed to `user`
    pub fn into_new_area(self, user: &UserId) -> NewArea {
        NewArea {
            name: self.name,
            address: self.address,
            description: self.description,
            coordinate: self.coordinate,
            facilities: self.facilities,
            created_by: user.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AreaDraft {
        AreaDraft::new("  Riverside bench ", " Yonghe ")
            .with_coordinate(Coordinate::new(25.012, 121.5064))
            .with_description("  under the bridge  ")
            .with_facility(Facility::Covered)
            .with_photo("file:///tmp/photo.jpg")
    }

    #[test]
    fn test_valid_draft_is_trimmed() {
        let valid = complete().validate().unwrap();
        assert_eq!(valid.name, "Riverside bench");
        assert_eq!(valid.address, "Yonghe");
        assert_eq!(valid.description, "under the bridge");
        assert_eq!(valid.photo.as_deref(), Some("file:///tmp/photo.jpg"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let draft = AreaDraft { name: "   ".into(), ..complete() };
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn test_blank_address_rejected() {
        let draft = AreaDraft { address: String::new(), ..complete() };
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("address")));
    }

    #[test]
    fn test_missing_coordinate_rejected() {
        let draft = AreaDraft { coordinate: None, ..complete() };
        assert_eq!(draft.validate(), Err(ValidationError::MissingCoordinate));
    }

    #[test]
    fn test_out_of_range_coordinate_rejected() {
        let draft = complete().with_coordinate(Coordinate::new(0.0, 200.0));
        assert!(matches!(draft.validate(), Err(ValidationError::InvalidCoordinate(_))));
    }

    #[test]
    fn test_blank_photo_dropped() {
        let draft = complete().with_photo("  ");
        assert_eq!(draft.validate().unwrap().photo, None);
    }

    #[test]
    fn test_into_new_area() {
        let user = UserId::new("user-1");
        let new_area = complete().validate().unwrap().into_new_area(&user);
        assert_eq!(new_area.created_by, user);
        assert!(new_area.facilities.has(Facility::Covered));
    }

    #[test]
    fn test_validation_error_maps_to_code() {
        let err: Error = ValidationError::MissingField("name").into();
        assert_eq!(err.code, ErrorCode::MissingField);
    }
}
