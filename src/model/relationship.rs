//! Relationship records
//!
//! A relationship is a directed edge `parent -> child` labeled with a role.
//! Multiple roles between the same pair are permitted; the store appends
//! whatever it is given.

use super::reject_embedded_nul;
use crate::errors::LoreResult;

/// A directed, role-labeled edge between two entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRelationship {
    /// Label of the parent entity
    pub parent: String,
    /// Label of the child entity
    pub child: String,
    /// Role of the edge
    pub role: String,
}

impl EntityRelationship {
    /// Create a new relationship.
    pub fn new(
        parent: impl Into<String>,
        child: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            role: role.into(),
        }
    }

    /// Checks that every text field can cross the boundary.
    pub fn validate(&self) -> LoreResult<()> {
        reject_embedded_nul("parent", &self.parent)?;
        reject_embedded_nul("child", &self.child)?;
        reject_embedded_nul("role", &self.role)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_relationship_passes() {
        let rel = EntityRelationship::new("testparent", "testchild", "testrole");
        assert!(rel.validate().is_ok());
    }

    #[test]
    fn test_duplicate_edges_are_representable() {
        let a = EntityRelationship::new("p", "c", "ally");
        let b = EntityRelationship::new("p", "c", "ally");
        assert_eq!(a, b);
    }

    #[test]
    fn test_nul_in_any_field_fails() {
        let bad = "x\0y";
        assert!(EntityRelationship::new(bad, "c", "r").validate().is_err());
        assert!(EntityRelationship::new("p", bad, "r").validate().is_err());
        assert!(EntityRelationship::new("p", "c", bad).validate().is_err());
    }
}
