//! Notices shown on the front page

use crate::types::{is_iso_date, Collection, Document, Patch, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Notice category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeCategory {
    #[default]
    Info,
    Important,
    Event,
}

impl NoticeCategory {
    /// Badge text shown next to the notice
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Important => "重要",
            Self::Event => "イベント",
        }
    }
}

impl fmt::Display for NoticeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Important => write!(f, "IMPORTANT"),
            Self::Event => write!(f, "EVENT"),
        }
    }
}

impl FromStr for NoticeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INFO" => Ok(Self::Info),
            "IMPORTANT" => Ok(Self::Important),
            "EVENT" => Ok(Self::Event),
            other => Err(format!("unknown notice category '{}'", other)),
        }
    }
}

/// A dated notice with rich-text content
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Notice {
    pub id: String,
    pub date: String,
    pub title: String,
    pub category: NoticeCategory,
    pub content: String,
}

impl Document for Notice {
    const COLLECTION: Collection = Collection::Notices;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Partial update of a [`Notice`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<NoticeCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Patch for NoticePatch {
    type Target = Notice;

    fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn set_field(&mut self, name: &str, raw: &str) -> Result<(), String> {
        match name {
            "date" => self.date = Some(raw.to_string()),
            "title" => self.title = Some(raw.to_string()),
            "category" => self.category = Some(raw.parse()?),
            "content" => self.content = Some(raw.to_string()),
            other => return Err(format!("notices have no field '{}'", other)),
        }
        Ok(())
    }
}

impl Validator for NoticePatch {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.is_empty() {
            errors.push("Update must set at least one field".to_string());
        }
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            errors.push("Title cannot be empty".to_string());
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
