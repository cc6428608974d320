//! Book domain model

use crate::types::{parse_flag, Collection, Document, Patch, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog category. Stored as the Japanese label shown on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BookCategory {
    #[default]
    #[serde(rename = "小説")]
    Novel,
    #[serde(rename = "技術")]
    Technology,
    #[serde(rename = "料理")]
    Cooking,
    #[serde(rename = "ビジネス")]
    Business,
    #[serde(rename = "アート")]
    Art,
    #[serde(rename = "歴史")]
    History,
}

impl BookCategory {
    /// Every category, in admin selector order
    pub const ALL: [BookCategory; 6] = [
        BookCategory::Novel,
        BookCategory::Technology,
        BookCategory::Cooking,
        BookCategory::Business,
        BookCategory::Art,
        BookCategory::History,
    ];

    /// Stored label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Novel => "小説",
            Self::Technology => "技術",
            Self::Cooking => "料理",
            Self::Business => "ビジネス",
            Self::Art => "アート",
            Self::History => "歴史",
        }
    }
}

impl fmt::Display for BookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BookCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(category) = Self::ALL.iter().find(|c| c.label() == s) {
            return Ok(*category);
        }
        match s.to_ascii_lowercase().as_str() {
            "novel" => Ok(Self::Novel),
            "technology" | "tech" => Ok(Self::Technology),
            "cooking" => Ok(Self::Cooking),
            "business" => Ok(Self::Business),
            "art" => Ok(Self::Art),
            "history" => Ok(Self::History),
            other => Err(format!("unknown book category '{}'", other)),
        }
    }
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_url: String,
    pub category: BookCategory,
    pub is_new: bool,
    pub is_recommended: bool,
}

impl Book {
    /// Creates a book with the required fields; the id is assigned by the store
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }
}

impl Document for Book {
    const COLLECTION: Collection = Collection::Books;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Partial update of a [`Book`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<BookCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_recommended: Option<bool>,
}

impl Patch for BookPatch {
    type Target = Book;

    fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn set_field(&mut self, name: &str, raw: &str) -> Result<(), String> {
        match name {
            "title" => self.title = Some(raw.to_string()),
            "author" => self.author = Some(raw.to_string()),
            "description" => self.description = Some(raw.to_string()),
            "coverUrl" => self.cover_url = Some(raw.to_string()),
            "category" => self.category = Some(raw.parse()?),
            "isNew" => self.is_new = Some(parse_flag(raw)?),
            "isRecommended" => self.is_recommended = Some(parse_flag(raw)?),
            other => return Err(format!("books have no field '{}'", other)),
        }
        Ok(())
    }
}

impl Validator for BookPatch {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.is_empty() {
            errors.push("Update must set at least one field".to_string());
        }

        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            errors.push("Title cannot be empty".to_string());
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
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&BookCategory::Cooking).unwrap();
        assert_eq!(json, "\"料理\"");
        let parsed: BookCategory = serde_json::from_str("\"歴史\"").unwrap();
        assert_eq!(parsed, BookCategory::History);
    }

    #[test]
    fn test_category_from_str_accepts_both_forms() {
        assert_eq!("技術".parse::<BookCategory>(), Ok(BookCategory::Technology));
        assert_eq!("art".parse::<BookCategory>(), Ok(BookCategory::Art));
        assert!("poetry".parse::<BookCategory>().is_err());
    }

    #[test]
    fn test_to_fields_strips_id_and_uses_camel_case() {
        let mut book = Book::new("静寂の森", "佐藤 かおり");
        book.id = "1".to_string();
        book.is_new = true;

        let fields = book.to_fields().unwrap();
        assert!(!fields.contains_key("id"));
        assert_eq!(fields["isNew"], serde_json::json!(true));
        assert_eq!(fields["coverUrl"], serde_json::json!(""));
    }

    #[test]
    fn test_from_fields_takes_id_from_identity() {
        let fields = serde_json::json!({"title": "未来への建築", "id": "stale"});
        let book = Book::from_fields("abc", fields.as_object().unwrap()).unwrap();
        assert_eq!(book.id, "abc");
        assert_eq!(book.title, "未来への建築");
        assert_eq!(book.category, BookCategory::Novel);
        assert!(!book.is_recommended);
    }

    #[test]
    fn test_from_fields_rejects_wrong_types() {
        let fields = serde_json::json!({"title": 7});
        assert!(Book::from_fields("x", fields.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = BookPatch {
            is_new: Some(false),
            ..Default::default()
        };
        let fields = Patch::to_fields(&patch).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["isNew"], serde_json::json!(false));
    }

    #[test]
    fn test_patch_validation() {
        assert!(!BookPatch::default().is_valid());

        let blank_title = BookPatch {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!blank_title.is_valid());

        let mut patch = BookPatch::default();
        patch.set_field("isRecommended", "yes").unwrap();
        patch.set_field("category", "料理").unwrap();
        assert!(patch.is_valid());
        assert!(patch.set_field("isbn", "123").is_err());
    }
}
