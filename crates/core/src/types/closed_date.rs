//! Library closing days

use crate::types::{is_iso_date, Collection, Document, Patch, Validator};
use serde::{Deserialize, Serialize};

/// A day the library is closed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosedDate {
    pub id: String,
    pub date: String,
    pub reason: String,
}

impl Document for ClosedDate {
    const COLLECTION: Collection = Collection::ClosedDates;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Partial update of a [`ClosedDate`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedDatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Patch for ClosedDatePatch {
    type Target = ClosedDate;

    fn is_empty(&self) -> bool {
        self.date.is_none() && self.reason.is_none()
    }

    fn set_field(&mut self, name: &str, raw: &str) -> Result<(), String> {
        match name {
            "date" => self.date = Some(raw.to_string()),
            "reason" => self.reason = Some(raw.to_string()),
            other => return Err(format!("closed dates have no field '{}'", other)),
        }
        Ok(())
    }
}

impl Validator for ClosedDatePatch {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.is_empty() {
            errors.push("Update must set at least one field".to_string());
        }
        if matches!(&self.date, Some(date) if !is_iso_date(date)) {
            errors.push("Date must be formatted as YYYY-MM-DD".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_date_validation() {
        let patch = ClosedDatePatch {
            date: Some("2024-05-27".to_string()),
            reason: None,
        };
        assert!(patch.is_valid());

        let patch = ClosedDatePatch {
            date: Some("2024-02-30".to_string()),
            reason: None,
        };
        assert!(!patch.is_valid());
    }
}
