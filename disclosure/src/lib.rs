//! Disclosure-aware settings trees.
//!
//! An operator edits a copy of the configuration read at some
//! [`DisclosureLevel`]. This crate works out what they actually changed and
//! what should be written back:
//! - **Tree**: [`ConfigTree`] holds nested mappings, lists and scalars. Hidden
//!   values are a tagged [`Placeholder`] scalar, never a magic string.
//! - **Policy**: a [`ClassificationTable`] maps field paths to a
//!   [`Sensitivity`]; [`DisclosurePolicy`] decides per level which leaves are
//!   shown, masked, or omitted.
//! - **Diff**: [`diff`] produces a sparse [`ChangeSet`] of differing paths.
//! - **Gate**: [`ApplyGate`] strips placeholder echoes and yields a named
//!   [`GateOutcome`], with a section-grouped [`ChangeSummary`] for review.
//!
//! [`EditSession`] drives the whole cycle against a [`ConfigBackend`].
//!
//! Classifications can be declared next to the fields of a settings struct:
//!
//! ```ignore
//! use disclosure::{ClassificationTable, Sensitivity, SettingsLayout, Token};
//!
//! #[derive(SettingsLayout)]
//! struct Settings {
//!     #[setting]
//!     api_keys: ApiKeys,
//! }
//!
//! #[derive(SettingsLayout)]
//! struct ApiKeys {
//!     label: String,
//!     #[setting(Token)]
//!     secret: String,
//! }
//!
//! let table = ClassificationTable::for_layout::<Settings>();
//! assert_eq!(
//!     table.rule_for(&["api_keys", "secret"]).sensitivity(),
//!     Sensitivity::Secret
//! );
//! ```
//!
//! What it does not do:
//! - validate values against a schema
//! - merge concurrent edits from several operators
//! - perform I/O beyond the [`ConfigBackend`] calls it is given

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

pub use disclosure_derive::SettingsLayout;

mod backend;
mod classification;
mod diff;
mod gate;
mod layout;
mod policy;
mod session;
pub mod slog;
mod tree;

pub use backend::{ConfigBackend, MemoryBackend, MemoryBackendError};
pub use classification::{
    Classification, Email, Password, Public, Secret, Sensitive, Sensitivity, Token,
};
pub use diff::{diff, Change, ChangeMap, ChangeNode, ChangeSet};
pub use gate::{
    strip_placeholders, ApplyGate, ChangeSummary, GateOutcome, MaskedEdits, PendingApply,
    Redacted, SectionSummary,
};
pub use layout::SettingsLayout;
pub use policy::{
    ClassificationTable, DisclosureLevel, DisclosurePolicy, FieldRule, HintPolicy, KeepConfig,
    MaskConfig, ParseLevelError, PublicView, Visibility, MASK_CHAR, REDACTED_PLACEHOLDER,
};
pub use session::{EditSession, Review, SessionError, SessionState};
pub use tree::{
    ConfigTree, FieldPath, Mapping, Node, PathError, Placeholder, PlaceholderMarker,
    PlaceholderOrigin, Scalar, ShapeError,
};
