use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tables::{self, TableSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameVariant {
    Fallout1,
    Fallout2,
}

impl GameVariant {
    pub fn tables(self) -> &'static TableSet {
        match self {
            Self::Fallout1 => &tables::fallout1::TABLES,
            Self::Fallout2 => &tables::fallout2::TABLES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fallout1 => "Fallout 1",
            Self::Fallout2 => "Fallout 2",
        }
    }

    /// Accepts the spellings the CLI has always taken: `1`, `fo1`, `fallout1`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "1" | "fo1" | "fallout1" => Some(Self::Fallout1),
            "2" | "fo2" | "fallout2" => Some(Self::Fallout2),
            _ => None,
        }
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
