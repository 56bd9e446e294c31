use std::fmt::Display;

use console::{style, StyledObject};

// One function per role so the summary, spinners and banner stay consistent.

pub fn heading(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().underlined()
}

pub fn emphasis(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}

pub fn value(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn muted(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn success(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

/// Partial results, in-flight work and counts worth a second look.
pub fn warning(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn failure(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn banner(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}
