use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stored as base stat 34 of the critter proto. Values other than 0 and 1
/// are kept verbatim so they survive a decode/encode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown(i32),
}

impl From<i32> for Gender {
    fn from(raw: i32) -> Self {
        match raw {
            0 => Self::Male,
            1 => Self::Female,
            other => Self::Unknown(other),
        }
    }
}

impl From<Gender> for i32 {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => 0,
            Gender::Female => 1,
            Gender::Unknown(other) => other,
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(format!("invalid gender '{other}', expected male or female")),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => f.write_str("Male"),
            Self::Female => f.write_str("Female"),
            Self::Unknown(v) => write!(f, "Unknown ({v})"),
        }
    }
}
