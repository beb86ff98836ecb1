//! Dispatcher options

use serde::{Deserialize, Serialize};

/// Options for a [`Dispatcher`](super::Dispatcher)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DuplicateOptions {
    /// Maximum nesting depth (default: unbounded). Going deeper raises a
    /// `RangeError`, as stack exhaustion would.
    pub max_depth: Option<usize>,
    /// Also transfer properties keyed by well-known symbols (default: false)
    pub copy_well_known_symbols: bool,
}

impl DuplicateOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DuplicateOptions::default();
        assert_eq!(options.max_depth, None);
        assert!(!options.copy_well_known_symbols);
        assert_eq!(DuplicateOptions::default().with_max_depth(3).max_depth, Some(3));
    }
}
