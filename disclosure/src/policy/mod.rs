//! Disclosure policy: which leaves a read reveals, masks, or omits.
//!
//! - **`hint`**: how a hidden value is rendered as a placeholder (`HintPolicy`)
//! - **`table`**: which rule governs each field path (`ClassificationTable`)
//! - **`level`**: the decision itself for one level (`DisclosurePolicy`)
//!
//! Classification markers live in `crate::classification`.

mod hint;
mod level;
mod table;

pub use hint::{HintPolicy, KeepConfig, MaskConfig, MASK_CHAR, REDACTED_PLACEHOLDER};
pub use level::{DisclosureLevel, DisclosurePolicy, ParseLevelError, Visibility};
pub use table::{ClassificationTable, FieldRule, PublicView};
