//! Styles and color themes.
//!
//! A [`Theme`] is a plain record passed into rendering; nothing here is
//! global. Styles are written the way they appear in config files:
//! whitespace-separated attributes and colors, e.g. `"bold #ce93f9"`.

use std::fmt;
use std::str::FromStr;

use crossterm::style::{Attribute, Color, ContentStyle};
use crossterm::tty::IsTty;
use serde::{Deserialize, Serialize};

/// A text style: optional foreground color plus attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style(ContentStyle);

impl Style {
    /// A style that leaves text untouched.
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn is_plain(&self) -> bool {
        self.0.foreground_color.is_none()
            && self.0.background_color.is_none()
            && self.0.attributes.is_empty()
    }

    /// Wrap `text` in this style's escape sequences.
    pub fn paint(&self, text: &str) -> String {
        if self.is_plain() || text.is_empty() {
            text.to_string()
        } else {
            self.0.apply(text).to_string()
        }
    }
}

/// Error for style strings that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid style token `{0}`")]
pub struct StyleParseError(pub String);

impl FromStr for Style {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut style = ContentStyle::new();
        for token in s.split_whitespace() {
            match token.to_ascii_lowercase().as_str() {
                "bold" => style.attributes.set(Attribute::Bold),
                "dim" => style.attributes.set(Attribute::Dim),
                "italic" => style.attributes.set(Attribute::Italic),
                "underline" => style.attributes.set(Attribute::Underlined),
                "reverse" => style.attributes.set(Attribute::Reverse),
                lower => style.foreground_color = Some(parse_color(lower, token)?),
            }
        }
        Ok(Style(style))
    }
}

fn parse_color(lower: &str, original: &str) -> Result<Color, StyleParseError> {
    if let Some(hex) = lower.strip_prefix('#') {
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                return Ok(Color::Rgb { r, g, b });
            }
        }
        return Err(StyleParseError(original.to_string()));
    }
    Color::try_from(lower).map_err(|_| StyleParseError(original.to_string()))
}

/// Named styles used across the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub title: Style,
    pub description: Style,
    pub option: Style,
    pub comment: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let style = |s: &str| s.parse().unwrap_or_default();
        Self {
            title: style("bold #ce93f9"),
            description: style("#b9f29f"),
            option: style("#64aaaa"),
            comment: style("#6272a4"),
        }
    }
}

impl Theme {
    /// A theme without any styling.
    pub fn plain() -> Self {
        Self {
            title: Style::plain(),
            description: Style::plain(),
            option: Style::plain(),
            comment: Style::plain(),
        }
    }
}

/// When to emit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when stdout is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Decide whether to emit color on stdout.
    pub fn enabled(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_tty()
            }
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Auto => write!(f, "auto"),
            ColorMode::Always => write!(f, "always"),
            ColorMode::Never => write!(f, "never"),
        }
    }
}
