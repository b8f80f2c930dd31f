//! Verification badges.
//!
//! The model is asked to emit a `Badge: <verdict>` line. The formatter finds
//! every such line and replaces it with a coloured inline span.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict category shown in the verification panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Badge {
    True,
    False,
    Mislead,
    Unverified,
}

impl Badge {
    pub const ALL: [Badge; 4] = [Badge::True, Badge::False, Badge::Mislead, Badge::Unverified];

    /// Classify a verdict word. Anything that is not exactly TRUE, FALSE or
    /// MISLEAD (ignoring case and surrounding whitespace) is unverified.
    pub fn classify(word: &str) -> Self {
        match word.trim().to_uppercase().as_str() {
            "TRUE" => Badge::True,
            "FALSE" => Badge::False,
            "MISLEAD" => Badge::Mislead,
            _ => Badge::Unverified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Badge::True => "TRUE",
            Badge::False => "FALSE",
            Badge::Mislead => "MISLEAD",
            Badge::Unverified => "UNVERIFIED",
        }
    }

    /// CSS modifier class used by the page stylesheet.
    pub fn css_class(&self) -> &'static str {
        match self {
            Badge::True => "badge-green",
            Badge::False => "badge-red",
            Badge::Mislead => "badge-yellow",
            Badge::Unverified => "badge-blue",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Background colour for each badge category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgePalette {
    #[serde(rename = "TRUE")]
    pub true_color: String,
    #[serde(rename = "FALSE")]
    pub false_color: String,
    #[serde(rename = "MISLEAD")]
    pub mislead_color: String,
    #[serde(rename = "UNVERIFIED")]
    pub unverified_color: String,
}

impl Default for BadgePalette {
    fn default() -> Self {
        Self {
            true_color: "#4CAF50".to_string(),
            false_color: "#E53935".to_string(),
            mislead_color: "#FFB300".to_string(),
            unverified_color: "#1E88E5".to_string(),
        }
    }
}

impl BadgePalette {
    pub fn color(&self, badge: Badge) -> &str {
        match badge {
            Badge::True => &self.true_color,
            Badge::False => &self.false_color,
            Badge::Mislead => &self.mislead_color,
            Badge::Unverified => &self.unverified_color,
        }
    }
}

/// Text with its badge lines replaced by markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedText {
    pub text: String,
    /// Badges in the order they appeared.
    pub badges: Vec<Badge>,
}

impl FormattedText {
    /// The first badge found, taken as the report's verdict.
    pub fn verdict(&self) -> Option<Badge> {
        self.badges.first().copied()
    }
}

/// Replaces `Badge: <word>` occurrences with styled spans.
#[derive(Debug, Clone)]
pub struct BadgeFormatter {
    pattern: Regex,
    palette: BadgePalette,
}

const BADGE_PATTERN: &str = r"(?i)Badge:\s*(\w+)";

impl BadgeFormatter {
    pub fn new(palette: BadgePalette) -> Self {
        // The pattern is a constant, so compilation cannot fail at runtime.
        let pattern = Regex::new(BADGE_PATTERN).expect("badge pattern is valid");
        Self { pattern, palette }
    }

    pub fn palette(&self) -> &BadgePalette {
        &self.palette
    }

    /// Markup fragment that replaces one badge match.
    pub fn span(&self, badge: Badge) -> String {
        format!(
            "Badge: <span class=\"badge {}\" style=\"background-color:{}\">{}</span>",
            badge.css_class(),
            self.palette.color(badge),
            badge.label()
        )
    }

    /// Single left-to-right pass over `text`; each match is replaced once
    /// with the markup span for its badge.
    pub fn format(&self, text: &str) -> FormattedText {
        self.replace_with(text, |badge| self.span(badge))
    }

    /// Same pass as [`format`](Self::format) with a caller-supplied
    /// replacement for each classified badge.
    pub fn replace_with<F>(&self, text: &str, mut replacement: F) -> FormattedText
    where
        F: FnMut(Badge) -> String,
    {
        let mut badges = Vec::new();
        let replaced = self.pattern.replace_all(text, |caps: &Captures| {
            let word = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let badge = Badge::classify(word);
            badges.push(badge);
            replacement(badge)
        });

        FormattedText {
            text: replaced.into_owned(),
            badges,
        }
    }
}

impl Default for BadgeFormatter {
    fn default() -> Self {
        Self::new(BadgePalette::default())
    }
}
