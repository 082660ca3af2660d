//! Static field layouts for settings structs.
//!
//! `#[derive(SettingsLayout)]` implements [`SettingsLayout`] for a struct whose
//! fields mirror the configuration tree. The generated impl writes one
//! [`ClassificationTable`] entry per classified field and descends into
//! fields marked `#[setting]`.

use crate::{policy::ClassificationTable, tree::FieldPath};

/// A type whose fields describe part of the configuration tree.
pub trait SettingsLayout {
    /// Records the classification of every field under `prefix`.
    fn classify_into(prefix: &FieldPath, table: &mut ClassificationTable);

    /// The table for a tree rooted at this type.
    fn classification_table() -> ClassificationTable
    where
        Self: Sized,
    {
        ClassificationTable::for_layout::<Self>()
    }
}

impl<T: SettingsLayout> SettingsLayout for Option<T> {
    fn classify_into(prefix: &FieldPath, table: &mut ClassificationTable) {
        T::classify_into(prefix, table);
    }
}

impl<T: SettingsLayout> SettingsLayout for Box<T> {
    fn classify_into(prefix: &FieldPath, table: &mut ClassificationTable) {
        T::classify_into(prefix, table);
    }
}

#[cfg(test)]
mod tests {
    use super::SettingsLayout;
    use crate::{
        classification::{Classification, Sensitivity, Token},
        policy::ClassificationTable,
        tree::FieldPath,
    };

    struct ApiKeys;

    impl SettingsLayout for ApiKeys {
        fn classify_into(prefix: &FieldPath, table: &mut ClassificationTable) {
            table.insert(prefix.child("secret"), Token::rule());
        }
    }

    #[test]
    fn wrappers_forward_to_inner_layout() {
        let mut table = ClassificationTable::new();
        <Option<Box<ApiKeys>>>::classify_into(&FieldPath::from("apiKeys"), &mut table);
        assert_eq!(
            table.rule_for(&["apiKeys", "secret"]).sensitivity(),
            Sensitivity::Secret
        );
    }

    #[test]
    fn classification_table_starts_at_root() {
        let table = ApiKeys::classification_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rule_for(&["secret"]).sensitivity(), Sensitivity::Secret);
    }
}
