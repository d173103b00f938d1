//! Catalogue of the shortcode widgets under test.

use serde::{Deserialize, Serialize};

/// A shortcode widget family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Takeaways,
    Faq,
    Toc,
    Audio,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 4] = [Self::Takeaways, Self::Faq, Self::Toc, Self::Audio];

    /// Class-name segment after the `hmg-ai-` prefix
    pub fn slug(self) -> &'static str {
        match self {
            Self::Takeaways => "takeaways",
            Self::Faq => "faq",
            Self::Toc => "toc",
            Self::Audio => "audio",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Takeaways => "Takeaways",
            Self::Faq => "FAQ",
            Self::Toc => "Table of Contents",
            Self::Audio => "Audio Player",
        }
    }

    /// Display styles the widget renders in
    pub fn styles(self) -> &'static [&'static str] {
        match self {
            Self::Takeaways => &["default", "numbered", "cards", "highlights"],
            Self::Faq => &["accordion", "list", "cards"],
            Self::Toc => &["numbered", "horizontal", "minimal", "sidebar"],
            Self::Audio => &["player", "compact", "minimal", "card"],
        }
    }

    /// CSS class on every root element of this widget
    pub fn root_class(self) -> String {
        format!("hmg-ai-{}", self.slug())
    }

    /// Selector matching any root element of this widget
    pub fn root_selector(self) -> String {
        format!(".{}", self.root_class())
    }

    /// CSS class marking a root element rendered in `style`
    pub fn style_class(self, style: &str) -> String {
        format!("hmg-ai-{}-{}", self.slug(), style)
    }

    /// Selector matching the root element rendered in `style`
    pub fn style_selector(self, style: &str) -> String {
        format!("{}.{}", self.root_selector(), self.style_class(style))
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Root selectors of all four widgets
pub fn root_selectors() -> Vec<String> {
    WidgetKind::ALL.iter().map(|kind| kind.root_selector()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors() {
        assert_eq!(WidgetKind::Faq.root_selector(), ".hmg-ai-faq");
        assert_eq!(
            WidgetKind::Takeaways.style_selector("cards"),
            ".hmg-ai-takeaways.hmg-ai-takeaways-cards"
        );
        assert_eq!(
            root_selectors(),
            vec![".hmg-ai-takeaways", ".hmg-ai-faq", ".hmg-ai-toc", ".hmg-ai-audio"]
        );
    }

    #[test]
    fn test_style_counts() {
        let counts: Vec<usize> = WidgetKind::ALL.iter().map(|k| k.styles().len()).collect();
        assert_eq!(counts, vec![4, 3, 4, 4]);
    }
}
