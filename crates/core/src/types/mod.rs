//! Domain types for OctLib
//!
//! One module per entity kind:
//! - `book`: catalog entries and their categories
//! - `news`: newsletter issues
//! - `notice`: front-page notices
//! - `closed_date`: closing days
//! - `survey`: survey questions
//! - `feature`: the monthly feature singleton
//! - `librarian`: static staff profiles
//! - `common`: collections, the `Document`/`Patch` traits, date helpers

mod book;
mod closed_date;
mod common;
mod feature;
mod librarian;
mod news;
mod notice;
mod survey;

pub use book::{Book, BookCategory, BookPatch};
pub use closed_date::{ClosedDate, ClosedDatePatch};
pub use common::{
    is_iso_date, parse_flag, to_object, today_iso, Collection, Document, Fields, Patch,
    Validator, ISO_DATE_FORMAT,
};
pub use feature::{MonthlyFeature, FEATURE_DOC_ID};
pub use librarian::Librarian;
pub use news::{NewsItem, NewsPatch};
pub use notice::{Notice, NoticeCategory, NoticePatch};
pub use survey::{QuestionType, SurveyQuestion, SurveyQuestionPatch};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_document_maps_to_its_collection() {
        assert_eq!(Book::COLLECTION, Collection::Books);
        assert_eq!(NewsItem::COLLECTION, Collection::News);
        assert_eq!(Notice::COLLECTION, Collection::Notices);
        assert_eq!(ClosedDate::COLLECTION, Collection::ClosedDates);
        assert_eq!(SurveyQuestion::COLLECTION, Collection::Survey);
        assert_eq!(MonthlyFeature::COLLECTION, Collection::Features);
    }
}
