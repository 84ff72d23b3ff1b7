//! Facility flags attached to an area
//!
//! The remote table stores facilities as a loose JSON object. Here it is a
//! closed record: unknown keys are dropped when reading and unset flags are
//! left out when writing. A flag or blob of the wrong type reads as unset
//! so one bad row cannot spoil a whole listing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;
use std::fmt;
use std::str::FromStr;

/// One of the known facility flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facility {
    Covered,
    Seating,
    Ashtray,
    Lighting,
    Shelter,
}

impl Facility {
    /// Every known facility, in display order
    pub const ALL: [Facility; 5] = [
        Facility::Covered,
        Facility::Seating,
        Facility::Ashtray,
        Facility::Lighting,
        Facility::Shelter,
    ];

    /// Key used in the stored JSON blob
    pub fn key(self) -> &'static str {
        match self {
            Facility::Covered => "covered",
            Facility::Seating => "seating",
            Facility::Ashtray => "ashtray",
            Facility::Lighting => "lighting",
            Facility::Shelter => "shelter",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Facility::Covered => "Covered",
            Facility::Seating => "Seating",
            Facility::Ashtray => "Ashtray",
            Facility::Lighting => "Lighting",
            Facility::Shelter => "Shelter",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Facility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Facility::ALL
            .into_iter()
            .find(|f| f.key() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Facility::ALL.iter().map(|f| f.key()).collect();
                format!("unknown facility {s:?} (expected one of: {})", known.join(", "))
            })
    }
}

/// Facility flags; `None` means the submitter never said
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facilities {
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub covered: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub seating: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub ashtray: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub lighting: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub shelter: Option<bool>,
}

impl Facilities {
    fn slot(&self, facility: Facility) -> Option<bool> {
        match facility {
            Facility::Covered => self.covered,
            Facility::Seating => self.seating,
            Facility::Ashtray => self.ashtray,
            Facility::Lighting => self.lighting,
            Facility::Shelter => self.shelter,
        }
    }

    /// Whether the facility is present. Unset counts as absent.
    pub fn has(&self, facility: Facility) -> bool {
        self.slot(facility).unwrap_or(false)
    }

    /// Set a flag explicitly
    pub fn set(&mut self, facility: Facility, value: bool) {
        let slot = match facility {
            Facility::Covered => &mut self.covered,
            Facility::Seating => &mut self.seating,
            Facility::Ashtray => &mut self.ashtray,
            Facility::Lighting => &mut self.lighting,
            Facility::Shelter => &mut self.shelter,
        };
        *slot = Some(value);
    }

    /// Builder-style `set(facility, true)`
    #[must_use]
    pub fn with(mut self, facility: Facility) -> Self {
        self.set(facility, true);
        self
    }

    /// Facilities that are present, in display order
    pub fn enabled(&self) -> impl Iterator<Item = Facility> + '_ {
        Facility::ALL.into_iter().filter(|f| self.has(*f))
    }
}

impl FromIterator<Facility> for Facilities {
    fn from_iter<I: IntoIterator<Item = Facility>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Facilities::with)
    }
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Some(flag),
        Value::Null => None,
        other => {
            warn!(value = %other, "Ignoring non-boolean facility flag");
            None
        }
    })
}

/// Reads a `null` or malformed blob the same as a missing one.
pub(crate) fn lenient_blob<'de, D>(deserializer: D) -> Result<Facilities, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Facilities::default()),
        blob @ Value::Object(_) => Ok(serde_json::from_value(blob).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable facilities");
            Facilities::default()
        })),
        other => {
            warn!(value = %other, "Ignoring facilities that are not an object");
            Ok(Facilities::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_keys_ignored() {
        let facilities: Facilities =
            serde_json::from_value(json!({"covered": true, "wifi": true, "seating": false})).unwrap();
        assert_eq!(facilities.covered, Some(true));
        assert_eq!(facilities.seating, Some(false));
        assert_eq!(facilities.ashtray, None);
    }

    #[test]
    fn test_non_boolean_flag_reads_as_unset() {
        let facilities: Facilities =
            serde_json::from_value(json!({"covered": "yes", "seating": true, "ashtray": 1})).unwrap();
        assert_eq!(facilities.covered, None);
        assert_eq!(facilities.seating, Some(true));
        assert_eq!(facilities.ashtray, None);
    }

    #[test]
    fn test_unset_flags_omitted_on_write() {
        let facilities = Facilities::default().with(Facility::Ashtray);
        let value = serde_json::to_value(facilities).unwrap();
        assert_eq!(value, json!({"ashtray": true}));
    }

    #[test]
    fn test_missing_defaults_to_false() {
        let facilities = Facilities::default();
        assert!(Facility::ALL.iter().all(|f| !facilities.has(*f)));
        assert_eq!(facilities.enabled().count(), 0);
    }

    #[test]
    fn test_enabled_order() {
        let facilities: Facilities = [Facility::Shelter, Facility::Covered].into_iter().collect();
        let enabled: Vec<_> = facilities.enabled().collect();
        assert_eq!(enabled, vec![Facility::Covered, Facility::Shelter]);
    }

    #[test]
    fn test_explicit_false_is_written() {
        let mut facilities = Facilities::default();
        facilities.set(Facility::Lighting, false);
        assert_eq!(serde_json::to_value(facilities).unwrap(), json!({"lighting": false}));
    }

    #[test]
    fn test_parse_facility() {
        assert_eq!("Covered".parse::<Facility>().unwrap(), Facility::Covered);
        assert_eq!(" shelter ".parse::<Facility>().unwrap(), Facility::Shelter);
        assert!("wifi".parse::<Facility>().unwrap_err().contains("covered"));
    }
}
