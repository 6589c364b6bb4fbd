use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KeelError;

/// Name of a deployment target. The set is closed: every profile Keel can
/// resolve is listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileName {
    /// Public test network (Baobab).
    Test,
    /// Production network (Cypress).
    Production,
}

impl ProfileName {
    /// Every known profile, in declaration order.
    pub const ALL: [ProfileName; 2] = [ProfileName::Test, ProfileName::Production];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileName::Test => "test",
            ProfileName::Production => "production",
        }
    }

    /// Comma-separated list of known names, for error messages.
    pub fn known() -> String {
        Self::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProfileName {
    type Err = KeelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| KeelError::UnknownProfile {
                name: s.to_string(),
                known: Self::known(),
            })
    }
}
