//! Repair-oriented views of a save: where each section sits, whether the
//! decoded values hang together, and how two saves differ.
//!
//! None of these fail on damaged input. They report what they could read.

mod compare;
mod layout;
mod validate;

pub use compare::{DiffValue, FieldDiff, SectionDiff, compare, compare_models, compare_sections};
pub use layout::{LayoutReport, SectionReport, layout};
pub use validate::{Status, ValidationReport, validate, validate_model};
