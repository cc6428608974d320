//! Staff profiles. Static content only, never stored remotely.

use serde::{Deserialize, Serialize};

/// A librarian introduced on the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Librarian {
    pub name: String,
    pub role: String,
    pub message: String,
    pub image_url: String,
}
