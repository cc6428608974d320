// crates/rich-text/src/style.rs
//! The `rt-*` class vocabulary

use std::fmt;

/// A presentational class recognized on `div`/`span` elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleClass {
    LargeHeading,
    MediumHeading,
    RedText,
    BlueText,
    YellowMarker,
    InfoBox,
    Quote,
    /// Not offered by the toolbar but present in stored content
    CinemaBox,
}

impl StyleClass {
    pub const ALL: [StyleClass; 8] = [
        StyleClass::LargeHeading,
        StyleClass::MediumHeading,
        StyleClass::RedText,
        StyleClass::BlueText,
        StyleClass::YellowMarker,
        StyleClass::InfoBox,
        StyleClass::Quote,
        StyleClass::CinemaBox,
    ];

    pub fn class_name(&self) -> &'static str {
        match self {
            Self::LargeHeading => "rt-h1-style",
            Self::MediumHeading => "rt-h2-style",
            Self::RedText => "rt-text-red",
            Self::BlueText => "rt-text-blue",
            Self::YellowMarker => "rt-marker-yellow",
            Self::InfoBox => "rt-box-info",
            Self::Quote => "rt-box-quote",
            Self::CinemaBox => "rt-box-cinema",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.class_name() == name)
    }

    /// Block classes are written on `div`, inline ones on `span`
    pub fn is_block(&self) -> bool {
        !matches!(self, Self::RedText | Self::BlueText | Self::YellowMarker)
    }

    pub fn tag_name(&self) -> &'static str {
        if self.is_block() {
            "div"
        } else {
            "span"
        }
    }
}

impl fmt::Display for StyleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_lookup() {
        for class in StyleClass::ALL {
            assert_eq!(StyleClass::from_class_name(class.class_name()), Some(class));
        }
        assert_eq!(StyleClass::from_class_name("rt-unknown"), None);
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(StyleClass::InfoBox.tag_name(), "div");
        assert_eq!(StyleClass::YellowMarker.tag_name(), "span");
    }
}
