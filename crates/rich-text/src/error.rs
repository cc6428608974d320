// crates/rich-text/src/error.rs
//! Error types for rich text handling

use thiserror::Error;

/// Result type for rich text operations
pub type RichTextResult<T> = Result<T, RichTextError>;

/// Errors that can occur while authoring or parsing rich text
#[derive(Debug, Error)]
pub enum RichTextError {
    /// Markup could not be tokenized past some point
    #[error("Malformed markup at byte {position}: {reason}")]
    MalformedMarkup { position: u64, reason: String },

    /// Toolbar tool name not recognized
    #[error("Unknown rich text tool: {0}")]
    UnknownTool(String),
}

impl RichTextError {
    pub(crate) fn malformed(position: u64, err: quick_xml::Error) -> Self {
        RichTextError::MalformedMarkup {
            position,
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RichTextError::UnknownTool("h9".to_string());
        assert!(format!("{}", err).contains("h9"));

        let err = RichTextError::MalformedMarkup {
            position: 12,
            reason: "unclosed tag".to_string(),
        };
        assert!(err.to_string().contains("byte 12"));
    }
}
