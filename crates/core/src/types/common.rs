//! Common types and traits shared across domain models

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A document body as stored remotely: a JSON object without the id
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Date format used by every dated entity
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Named collections in the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Books,
    News,
    Notices,
    ClosedDates,
    Survey,
    Features,
}

impl Collection {
    /// Every collection, in display order
    pub const ALL: [Collection; 6] = [
        Collection::Books,
        Collection::News,
        Collection::Notices,
        Collection::ClosedDates,
        Collection::Survey,
        Collection::Features,
    ];

    /// Name of the collection in the store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::News => "news",
            Self::Notices => "notices",
            Self::ClosedDates => "closed_dates",
            Self::Survey => "survey",
            Self::Features => "features",
        }
    }

    /// Device-local key recording that this collection has been seeded
    pub fn seed_marker_key(&self) -> &'static str {
        match self {
            Self::Books => "seeded_books",
            Self::News => "seeded_news",
            Self::Notices => "seeded_notices",
            Self::ClosedDates => "seeded_dates",
            Self::Survey => "seeded_survey",
            Self::Features => "seeded_features",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "books" | "book" => Ok(Self::Books),
            "news" => Ok(Self::News),
            "notices" | "notice" => Ok(Self::Notices),
            "closed_dates" | "dates" | "date" => Ok(Self::ClosedDates),
            "survey" | "questions" => Ok(Self::Survey),
            "features" | "feature" => Ok(Self::Features),
            other => Err(format!("unknown collection '{}'", other)),
        }
    }
}

/// Trait for types that can validate themselves
pub trait Validator {
    /// Validates the instance and returns errors if invalid
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// An entity stored as one document of a remote collection.
///
/// The id lives in the document identity, never in the body: it is taken
/// from the snapshot when mapping and stripped when writing.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection holding documents of this kind
    const COLLECTION: Collection;

    /// Store-assigned identifier
    fn id(&self) -> &str;

    /// Replaces the identifier
    fn set_id(&mut self, id: String);

    /// Maps a stored document into an entity
    fn from_fields(id: &str, fields: &Fields) -> Result<Self, serde_json::Error> {
        let mut entity: Self = serde_json::from_value(serde_json::Value::Object(fields.clone()))?;
        entity.set_id(id.to_string());
        Ok(entity)
    }

    /// Serializes the entity body, without its id
    fn to_fields(&self) -> Result<Fields, serde_json::Error> {
        let mut fields = to_object(self)?;
        fields.remove("id");
        Ok(fields)
    }
}

/// A partial update for one entity kind. Unset fields are not serialized,
/// so the store merge leaves them untouched.
pub trait Patch: Serialize + Validator {
    /// Entity this patch applies to
    type Target: Document;

    /// True when no field is set
    fn is_empty(&self) -> bool;

    /// Sets one field from its textual form, using the stored field name
    fn set_field(&mut self, name: &str, raw: &str) -> Result<(), String>;

    /// Serializes only the fields that are set
    fn to_fields(&self) -> Result<Fields, serde_json::Error> {
        to_object(self)
    }
}

/// Serializes a value that must be a JSON object
pub fn to_object<T: Serialize + ?Sized>(value: &T) -> Result<Fields, serde_json::Error> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Returns true if `value` is a valid ISO calendar date (`YYYY-MM-DD`)
pub fn is_iso_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).is_ok()
}

/// Today's date in ISO form, used for new admin items
pub fn today_iso() -> String {
    Utc::now().date_naive().format(ISO_DATE_FORMAT).to_string()
}

/// Parses a boolean field value as typed by an admin
pub fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("'{}' is not a boolean", other)),
    }
}
