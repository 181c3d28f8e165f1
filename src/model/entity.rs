//! Entity attribute records
//!
//! An entity column is one attribute slot of an entity: `(label, descriptor)`
//! addresses the slot, `description` is its value. The store does not enforce
//! uniqueness of `(label, descriptor)`; duplicates are appended as given.

use super::reject_embedded_nul;
use crate::errors::LoreResult;

/// One attribute slot of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityColumn {
    /// Entity the slot belongs to
    pub label: String,
    /// Name of the attribute
    pub descriptor: String,
    /// Value of the attribute
    pub description: String,
}

impl EntityColumn {
    /// Create a new entity column.
    pub fn new(
        label: impl Into<String>,
        descriptor: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            descriptor: descriptor.into(),
            description: description.into(),
        }
    }

    /// Checks that every text field can cross the boundary.
    pub fn validate(&self) -> LoreResult<()> {
        reject_embedded_nul("label", &self.label)?;
        reject_embedded_nul("descriptor", &self.descriptor)?;
        reject_embedded_nul("description", &self.description)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_column_passes() {
        let column = EntityColumn::new("testlabel", "testdescriptor", "testdescription");
        assert!(column.validate().is_ok());
    }

    #[test]
    fn test_empty_fields_are_valid() {
        let column = EntityColumn::new("", "", "");
        assert!(column.validate().is_ok());
    }

    #[test]
    fn test_nul_in_any_field_fails() {
        let bad = "a\0b";
        assert!(EntityColumn::new(bad, "d", "v").validate().is_err());
        assert!(EntityColumn::new("l", bad, "v").validate().is_err());
        assert!(EntityColumn::new("l", "d", bad).validate().is_err());
    }
}
