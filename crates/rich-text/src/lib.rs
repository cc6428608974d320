// crates/rich-text/src/lib.rs
//! Rich text for OctLib content fields
//!
//! Notices, newsletters and the monthly feature store their bodies as a
//! small HTML dialect: a few structural elements plus `div`/`span` carrying
//! one of the `rt-*` presentational classes. This crate provides:
//! - the authoring toolbar that appends tag templates to a field
//! - an allow-list parser producing a typed tree
//! - a renderer that only ever emits allow-listed, escaped markup
//!
//! # Example
//!
//! ```rust
//! use octlib_rich_text::{RichDocument, Tool};
//!
//! let content = Tool::InfoBox.insert("<p>開館時間のお知らせ</p>");
//! let doc = RichDocument::parse(&content);
//! assert_eq!(doc.plain_text(), "開館時間のお知らせ\nテキスト");
//! ```

mod document;
mod error;
mod parser;
mod style;
mod toolbar;

pub use document::{ElementKind, Node, RichDocument};
pub use error::{RichTextError, RichTextResult};
pub use parser::sanitize;
pub use style::StyleClass;
pub use toolbar::{insert_image, Tool, IMAGE_STYLE, PLACEHOLDER_TEXT};
