//! Neighboring-dataset relations.

use serde::{Deserialize, Serialize};

/// Which pairs of datasets count as neighbors for a privacy guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NeighboringRelation {
    /// One dataset is the other with a single record added or removed.
    #[default]
    AddOrRemoveOne,
    /// One record is replaced by another.
    ReplaceOne,
    /// One record is replaced by a special record.
    ReplaceSpecial,
}

impl std::fmt::Display for NeighboringRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NeighboringRelation::AddOrRemoveOne => "add_or_remove_one",
            NeighboringRelation::ReplaceOne => "replace_one",
            NeighboringRelation::ReplaceSpecial => "replace_special",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_serialization_matches_display() {
        for relation in [
            NeighboringRelation::AddOrRemoveOne,
            NeighboringRelation::ReplaceOne,
            NeighboringRelation::ReplaceSpecial,
        ] {
            let json = serde_json::to_string(&relation).unwrap();
            assert_eq!(json, format!("\"{}\"", relation));
        }
    }
}
