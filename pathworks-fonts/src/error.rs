use std::fmt;

/// Errors produced while loading font data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    /// The font bytes could not be parsed.
    ParseError(String),
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(msg) => write!(f, "font parse error: {msg}"),
        }
    }
}

impl std::error::Error for FontError {}
