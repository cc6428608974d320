//! Library newsletter issues

use crate::types::{is_iso_date, Collection, Document, Patch, Validator};
use serde::{Deserialize, Serialize};

/// A newsletter issue: a PDF download plus a rendered preview image
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    /// ISO date (`YYYY-MM-DD`); listings are ordered by it, newest first
    pub date: String,
    pub title: String,
    /// Rich text, see `octlib-rich-text`
    pub content: String,
    pub file_name: String,
    pub pdf_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
}

impl NewsItem {
    /// File name offered for download, with the site's fallback
    pub fn download_name(&self) -> &str {
        if self.file_name.is_empty() {
            "oct_news.pdf"
        } else {
            &self.file_name
        }
    }
}

impl Document for NewsItem {
    const COLLECTION: Collection = Collection::News;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Partial update of a [`NewsItem`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
}

impl Patch for NewsPatch {
    type Target = NewsItem;

    fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn set_field(&mut self, name: &str, raw: &str) -> Result<(), String> {
        let value = Some(raw.to_string());
        match name {
            "date" => self.date = value,
            "title" => self.title = value,
            "content" => self.content = value,
            "fileName" => self.file_name = value,
            "pdfUrl" => self.pdf_url = value,
            "previewImageUrl" => self.preview_image_url = value,
            other => return Err(format!("news items have no field '{}'", other)),
        }
        Ok(())
    }
}

impl Validator for NewsPatch {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_preview_is_not_serialized() {
        let item = NewsItem {
            title: "図書館通信 5月号".to_string(),
            ..Default::default()
        };
        let fields = item.to_fields().unwrap();
        assert!(!fields.contains_key("previewImageUrl"));
        assert!(fields.contains_key("pdfUrl"));
    }

    #[test]
    fn test_download_name_fallback() {
        let mut item = NewsItem::default();
        assert_eq!(item.download_name(), "oct_news.pdf");
        item.file_name = "oct_news_2024_05.pdf".to_string();
        assert_eq!(item.download_name(), "oct_news_2024_05.pdf");
    }

    #[test]
    fn test_patch_rejects_bad_date() {
        let patch = NewsPatch {
            date: Some("May 15".to_string()),
            ..Default::default()
        };
        let errors = patch.validate().unwrap_err();
        assert!(errors[0].contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_patch_set_field() {
        let mut patch = NewsPatch::default();
        patch.set_field("pdfUrl", "https://example.org/a.pdf").unwrap();
        patch.set_field("fileName", "a.pdf").unwrap();
        let fields = Patch::to_fields(&patch).unwrap();
        assert_eq!(fields.len(), 2);
        assert!(patch.set_field("author", "x").is_err());
    }
}
