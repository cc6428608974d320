//! Visitor survey questions

use crate::types::{Collection, Document, Patch, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a survey question is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Free text
    #[default]
    Text,
    /// Five-point rating
    Rating,
    /// Multiple choice
    Choice,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Rating => write!(f, "rating"),
            Self::Choice => write!(f, "choice"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "rating" => Ok(Self::Rating),
            "choice" => Ok(Self::Choice),
            other => Err(format!("unknown question type '{}'", other)),
        }
    }
}

/// A survey question
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyQuestion {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
}

impl Document for SurveyQuestion {
    const COLLECTION: Collection = Collection::Survey;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Partial update of a [`SurveyQuestion`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<QuestionType>,
}

impl Patch for SurveyQuestionPatch {
    type Target = SurveyQuestion;

    fn is_empty(&self) -> bool {
        self.text.is_none() && self.kind.is_none()
    }

    fn set_field(&mut self, name: &str, raw: &str) -> Result<(), String> {
        match name {
            "text" => self.text = Some(raw.to_string()),
            "type" => self.kind = Some(raw.parse()?),
            other => return Err(format!("survey questions have no field '{}'", other)),
        }
        Ok(())
    }
}

impl Validator for SurveyQuestionPatch {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.is_empty() {
            errors.push("Update must set at least one field".to_string());
        }
        if matches!(&self.text, Some(text) if text.trim().is_empty()) {
            errors.push("Question text cannot be empty".to_string());
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
    fn test_type_field_name() {
        let question = SurveyQuestion {
            id: "q1".to_string(),
            text: "図書館の利用頻度はどれくらいですか？".to_string(),
            kind: QuestionType::Choice,
        };
        let fields = question.to_fields().unwrap();
        assert_eq!(fields["type"], serde_json::json!("choice"));
        assert!(!fields.contains_key("kind"));
    }

    #[test]
    fn test_patch_type_field() {
        let mut patch = SurveyQuestionPatch::default();
        patch.set_field("type", "rating").unwrap();
        let fields = Patch::to_fields(&patch).unwrap();
        assert_eq!(fields["type"], serde_json::json!("rating"));
    }
}
