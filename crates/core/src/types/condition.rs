//! Physical condition rating of a listed item.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Badge style used when a label can't be mapped to a known condition.
pub const NEUTRAL_BADGE_CLASS: &str = "bg-gray-100 text-gray-800";

/// Error returned when a string is not a recognized [`Condition`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown item condition: {0:?}")]
pub struct ConditionError(pub String);

/// The closed set of conditions a seller can choose from.
///
/// Serialized with the same lowercase labels buyers see (`"like new"`), and
/// accepts `like-new`/`like_new` spellings on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "like new", alias = "like-new", alias = "like_new")]
    LikeNew,
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "fair")]
    Fair,
    #[serde(rename = "poor")]
    Poor,
}

impl Condition {
    /// Every condition, best first.
    pub const ALL: [Self; 5] = [Self::New, Self::LikeNew, Self::Good, Self::Fair, Self::Poor];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::LikeNew => "like new",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }

    /// Form value (no spaces, safe in query strings and `<option>` values).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::LikeNew => "like-new",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }

    /// CSS classes for the condition badge on product cards.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::New => "bg-green-100 text-green-800",
            Self::LikeNew => "bg-blue-100 text-blue-800",
            Self::Good => "bg-yellow-100 text-yellow-800",
            Self::Fair => "bg-orange-100 text-orange-800",
            Self::Poor => "bg-red-100 text-red-800",
        }
    }

    /// Badge classes for an arbitrary label, falling back to the neutral badge.
    #[must_use]
    pub fn badge_class_for_label(label: &str) -> &'static str {
        label
            .parse::<Self>()
            .map_or(NEUTRAL_BADGE_CLASS, Self::badge_class)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | '_' => ' ',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "new" => Ok(Self::New),
            "like new" => Ok(Self::LikeNew),
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            "poor" => Ok(Self::Poor),
            _ => Err(ConditionError(s.to_string())),
        }
    }
}
