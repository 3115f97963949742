//! Sort specifications
//!
//! A [`Sorter`] names a field and a direction. The first sorter in a
//! request is the primary one. Whether sorting happens in the store
//! (ORDER BY pushdown) or in the result mapper is a deployment choice;
//! either way the augmenter binds each sorter's field to a generated
//! variable carrying the sort suffix so the mapper can find the key.

use crate::registry::local_name;
use casegraph_vocab::sort;
use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sort specification for a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sorter {
    /// Predicate IRI to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl Sorter {
    /// Create an ascending sorter
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Create a descending sorter
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Generated variable name this sorter binds to, suffix included
    pub fn sort_var(&self) -> String {
        format!("{}{}", local_name(&self.field), sort::SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_var_carries_suffix() {
        let sorter = Sorter::asc("http://ex.org/vocab#title");
        assert_eq!(sorter.sort_var(), "title_sort");
    }

    #[test]
    fn test_directions() {
        assert_eq!(
            Sorter::asc("http://ex.org/a").direction,
            SortDirection::Ascending
        );
        assert_eq!(
            Sorter::desc("http://ex.org/a").direction,
            SortDirection::Descending
        );
    }
}
