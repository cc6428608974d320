//! Domain model shared by every OctLib crate: the six kinds of site content,
//! their typed partial updates, the built-in default content and the
//! application-wide error taxonomy.

pub mod defaults;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    Book, BookCategory, BookPatch, ClosedDate, ClosedDatePatch, Collection, Document, Fields,
    Librarian, MonthlyFeature, NewsItem, NewsPatch, Notice, NoticeCategory, NoticePatch, Patch,
    QuestionType, SurveyQuestion, SurveyQuestionPatch, Validator, FEATURE_DOC_ID,
};
pub use types::{is_iso_date, today_iso};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_is_iso_date() {
        assert!(is_iso_date(&today_iso()));
    }
}
