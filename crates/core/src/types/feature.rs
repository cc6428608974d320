//! The monthly feature: a singleton document replaced wholesale on every edit

use crate::types::{to_object, Book, Collection, Fields, Validator};
use serde::{Deserialize, Serialize};

/// Well-known id of the feature document inside [`Collection::Features`]
pub const FEATURE_DOC_ID: &str = "current_feature";

/// The monthly feature shown in the hero section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonthlyFeature {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// Rich text
    pub content: String,
    pub image_url: String,
    /// Ids of featured books
    pub books: Vec<String>,
}

impl MonthlyFeature {
    /// Collection holding the singleton
    pub const COLLECTION: Collection = Collection::Features;

    /// Maps the stored document body
    pub fn from_fields(fields: &Fields) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(fields.clone()))
    }

    /// Full document body, for overwrite
    pub fn to_fields(&self) -> Result<Fields, serde_json::Error> {
        to_object(self)
    }

    /// Resolves the featured book ids against the catalog, keeping feature order.
    /// Ids with no matching book are skipped.
    pub fn resolve_books<'a>(&self, catalog: &'a [Book]) -> Vec<&'a Book> {
        self.books
            .iter()
            .filter_map(|id| catalog.iter().find(|book| &book.id == id))
            .collect()
    }
}

impl Validator for MonthlyFeature {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Feature title cannot be empty".to_string());
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
    fn test_resolve_books_keeps_feature_order() {
        let mut first = Book::new("静寂の森", "佐藤 かおり");
        first.id = "1".to_string();
        let mut third = Book::new("忘れられたレシピ", "祖母山 ツネ");
        third.id = "3".to_string();
        let catalog = vec![first, third];

        let feature = MonthlyFeature {
            books: vec!["3".to_string(), "missing".to_string(), "1".to_string()],
            ..Default::default()
        };

        let titles: Vec<_> = feature
            .resolve_books(&catalog)
            .iter()
            .map(|b| b.title.as_str())
            .collect();
        assert_eq!(titles, vec!["忘れられたレシピ", "静寂の森"]);
    }

    #[test]
    fn test_fields_use_camel_case() {
        let feature = MonthlyFeature {
            title: "珈琲と本".to_string(),
            image_url: "https://example.org/a.jpg".to_string(),
            ..Default::default()
        };
        let fields = feature.to_fields().unwrap();
        assert_eq!(fields["imageUrl"], serde_json::json!("https://example.org/a.jpg"));
        assert_eq!(MonthlyFeature::from_fields(&fields).unwrap(), feature);
    }
}
