//! Save codec, edit engine and diagnostics for Fallout 1 and Fallout 2
//! `SAVE.DAT` files.
//!
//! The read path is `decode` -> [`Model`] -> [`projection::Projection`].
//! The write path is `decode` -> [`patch::apply_edits`] -> [`patch::encode`].
//! Diagnostics work from raw bytes so they stay usable on damaged input.

pub mod derive;
pub mod diagnostics;
pub mod error;
pub mod gender;
pub mod items;
pub mod layout;
pub mod model;
pub mod object;
pub mod patch;
pub mod projection;
pub mod query;
pub mod reader;
pub mod sections;
pub mod tables;
pub mod variant;

mod decode;

pub use decode::{HEADER_LEN, decode};
pub use error::{
    EditError, EditRejection, EncodeError, FormatError, LayoutError, LookupWarning, PlanError,
};
pub use gender::Gender;
pub use model::Model;
pub use patch::{EditOp, ScalarField, apply_edits, encode, output_name_hint};
pub use variant::GameVariant;
