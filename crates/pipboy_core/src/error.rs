use serde::Serialize;
use thiserror::Error;

use crate::layout::SectionId;
use crate::variant::GameVariant;

/// Malformed, truncated or unrecognised input. The buffer is rejected as a
/// whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("input is {actual} bytes, need at least {required} for the save header")]
    TooShort { required: usize, actual: usize },

    #[error("unexpected end of data at offset {offset}: wanted {wanted} bytes, {available} left")]
    UnexpectedEof {
        offset: usize,
        wanted: usize,
        available: usize,
    },

    #[error("invalid save file signature, expected {expected:?}")]
    BadSignature { expected: &'static str },

    #[error("version {major}.{minor}{release} is not a {variant} save")]
    VersionMismatch {
        variant: GameVariant,
        major: i16,
        minor: i16,
        release: char,
    },

    #[error("{section}: {message}")]
    Section { section: SectionId, message: String },

    #[error("not a Fallout 1 save ({fallout1}); not a Fallout 2 save ({fallout2})")]
    Undetected {
        fallout1: Box<FormatError>,
        fallout2: Box<FormatError>,
    },
}

impl FormatError {
    pub fn section(section: SectionId, message: impl Into<String>) -> Self {
        Self::Section {
            section,
            message: message.into(),
        }
    }

    /// Attaches section context to a low-level read failure.
    pub(crate) fn in_section(self, section: SectionId) -> Self {
        match self {
            Self::UnexpectedEof { .. } => Self::Section {
                section,
                message: self.to_string(),
            },
            other => other,
        }
    }
}

/// Why a single edit operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditRejection {
    #[error("{field} value {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{table} index {index} is not in the {count}-entry table")]
    UnknownIndex {
        table: &'static str,
        index: i64,
        count: usize,
    },

    #[error("trait slot {0} does not exist, expected 0 or 1")]
    InvalidTraitSlot(usize),

    #[error("trait {0} is already selected in the other slot")]
    DuplicateTrait(usize),

    #[error("inventory item pid={pid} not found")]
    MissingItem { pid: i32 },

    #[error("inventory item pid={pid} has duplicate lines that hold items of their own")]
    NestedInventory { pid: i32 },

    #[error("inventory quantity overflow for pid={pid}: {current} + {delta}")]
    QuantityOverflow { pid: i32, current: i32, delta: i32 },

    #[error("{0} is not stored in this save")]
    Unavailable(&'static str),

    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

/// An edit batch stopped at `index`; ops before it remain applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("edit #{index} ({op}) rejected: {reason}")]
pub struct EditError {
    pub index: usize,
    pub op: String,
    #[source]
    pub reason: EditRejection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("file layout must contain at least one section")]
    Empty,

    #[error("layout gap/overlap around section {section}: expected start {expected}, got {actual}")]
    Discontiguous {
        section: SectionId,
        expected: usize,
        actual: usize,
    },

    #[error("invalid section range {section}: {start}..{end}")]
    Inverted {
        section: SectionId,
        start: usize,
        end: usize,
    },

    #[error("layout does not cover file: ended at {ended}, file length {file_len}")]
    Coverage { ended: usize, file_len: usize },
}

/// Producing output would break a format invariant. Validated edits never
/// cause this; it signals a defect or an unrepresentable state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("inventory holds {count} lines, the format allows at most {max}")]
    InventoryTooLarge { count: usize, max: usize },

    #[error("{field} patch needs {needed} bytes but {section} holds {len}")]
    PatchOutOfBounds {
        section: SectionId,
        field: &'static str,
        needed: usize,
        len: usize,
    },

    #[error("section {0} is missing from the decoded layout")]
    MissingSection(SectionId),

    #[error("item extra data length mismatch: declared {declared}, stored {stored}")]
    ItemData { declared: u8, stored: usize },

    #[error("emitted {actual} bytes, layout expects {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("projection is for {projection}, save is {model}")]
    VariantMismatch {
        model: GameVariant,
        projection: GameVariant,
    },

    #[error("projection lists {0} traits, at most 2 are allowed")]
    TooManyTraits(usize),
}

/// Non-fatal: a stored index does not resolve to a known name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{table} value {raw} at {location} does not resolve to a known entry")]
pub struct LookupWarning {
    pub table: &'static str,
    pub location: String,
    pub raw: i32,
}

#[cfg(test)]
mod tests {
    use super::{EditError, EditRejection, FormatError};
    use crate::layout::SectionId;

    #[test]
    fn eof_gains_section_context() {
        let err = FormatError::UnexpectedEof {
            offset: 40,
            wanted: 4,
            available: 1,
        }
        .in_section(SectionId::Handler(6));

        assert_eq!(
            err.to_string(),
            "handler:6: unexpected end of data at offset 40: wanted 4 bytes, 1 left"
        );
    }

    #[test]
    fn edit_error_names_op_and_reason() {
        let err = EditError {
            index: 2,
            op: "SetAttributeBase(0, 11)".to_string(),
            reason: EditRejection::OutOfRange {
                field: "Strength",
                value: 11,
                min: 1,
                max: 10,
            },
        };
        assert_eq!(
            err.to_string(),
            "edit #2 (SetAttributeBase(0, 11)) rejected: Strength value 11 is outside 1..=10"
        );
    }
}
