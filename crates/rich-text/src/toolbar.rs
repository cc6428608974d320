// crates/rich-text/src/toolbar.rs
//! Authoring toolbar: appends tag templates to a rich text field

use crate::error::RichTextError;
use crate::style::StyleClass;
use std::fmt;
use std::str::FromStr;

/// Placeholder text placed between inserted tags
pub const PLACEHOLDER_TEXT: &str = "テキスト";

/// Inline style applied to images inserted from the toolbar
pub const IMAGE_STYLE: &str = "width:100%; border-radius: 8px; margin: 1em 0;";

/// One toolbar button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    LargeHeading,
    MediumHeading,
    RedText,
    BlueText,
    YellowMarker,
    InfoBox,
    Quote,
}

impl Tool {
    /// Every tool, in toolbar order
    pub const ALL: [Tool; 7] = [
        Tool::LargeHeading,
        Tool::MediumHeading,
        Tool::RedText,
        Tool::BlueText,
        Tool::YellowMarker,
        Tool::InfoBox,
        Tool::Quote,
    ];

    /// Class written by this tool
    pub fn style(&self) -> StyleClass {
        match self {
            Self::LargeHeading => StyleClass::LargeHeading,
            Self::MediumHeading => StyleClass::MediumHeading,
            Self::RedText => StyleClass::RedText,
            Self::BlueText => StyleClass::BlueText,
            Self::YellowMarker => StyleClass::YellowMarker,
            Self::InfoBox => StyleClass::InfoBox,
            Self::Quote => StyleClass::Quote,
        }
    }

    /// Short name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::LargeHeading => "h1",
            Self::MediumHeading => "h2",
            Self::RedText => "red",
            Self::BlueText => "blue",
            Self::YellowMarker => "marker",
            Self::InfoBox => "info",
            Self::Quote => "quote",
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            Self::LargeHeading => "大見出し",
            Self::MediumHeading => "中見出し",
            Self::RedText => "赤字",
            Self::BlueText => "青字",
            Self::YellowMarker => "黄マーカー",
            Self::InfoBox => "情報BOX",
            Self::Quote => "引用",
        }
    }

    pub fn start_tag(&self) -> String {
        let style = self.style();
        format!("<{} class=\"{}\">", style.tag_name(), style.class_name())
    }

    pub fn end_tag(&self) -> String {
        format!("</{}>", self.style().tag_name())
    }

    /// Appends a newline and the tool's tag pair wrapped around the placeholder text
    pub fn insert(&self, current: &str) -> String {
        format!(
            "{}\n{}{}{}",
            current,
            self.start_tag(),
            PLACEHOLDER_TEXT,
            self.end_tag()
        )
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = RichTextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|tool| {
                tool.name().eq_ignore_ascii_case(s)
                    || tool.label() == s
                    || tool.style().class_name() == s
            })
            .ok_or_else(|| RichTextError::UnknownTool(s.to_string()))
    }
}

/// Appends an image element for `url`. A blank url leaves the text unchanged.
pub fn insert_image(current: &str, url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return current.to_string();
    }

    format!(
        "{}\n<img src=\"{}\" style=\"{}\" />",
        current,
        url.replace('"', "&quot;"),
        IMAGE_STYLE
    )
}
