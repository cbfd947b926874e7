//! Styles for session output.
//!
//! Named ANSI colors only, so the palette follows the user's terminal theme.
//! Emphasis comes from bold and dim attributes.

use crossterm::style::{Attribute, Color, ContentStyle};

pub fn dim() -> ContentStyle {
    ContentStyle {
        attributes: Attribute::Dim.into(),
        ..Default::default()
    }
}

pub fn prompt() -> ContentStyle {
    ContentStyle {
        foreground_color: Some(Color::Cyan),
        attributes: Attribute::Bold.into(),
        ..Default::default()
    }
}

pub fn output_line() -> ContentStyle {
    ContentStyle {
        foreground_color: Some(Color::Green),
        ..Default::default()
    }
}

pub fn error() -> ContentStyle {
    ContentStyle {
        foreground_color: Some(Color::Red),
        ..Default::default()
    }
}

pub fn result_line() -> ContentStyle {
    ContentStyle {
        foreground_color: Some(Color::Green),
        attributes: Attribute::Bold.into(),
        ..Default::default()
    }
}

pub fn warning() -> ContentStyle {
    ContentStyle {
        foreground_color: Some(Color::Yellow),
        ..Default::default()
    }
}
