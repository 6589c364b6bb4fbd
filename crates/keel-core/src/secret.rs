use std::fmt;

/// Credential material read from the environment.
///
/// The value never shows up in `Debug` or `Display` output and the type does
/// not implement `Serialize`. Use [`Secret::expose`] to hand the raw value to
/// whatever signs transactions, and [`Secret::masked`] when a hint is needed
/// in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, exactly as it was read.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Log-safe rendering: first and last four characters for long values,
    /// one `*` per character otherwise.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else if !chars.is_empty() {
            "*".repeat(chars.len())
        } else {
            "(empty)".to_string()
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}
