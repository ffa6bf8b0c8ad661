//! Fanout configuration for the tree.

use crate::errors::{TreeError, TreeResult};

/// Default minimum node fanout.
pub const DEFAULT_MIN_ENTRIES: usize = 6;

/// Default maximum node fanout.
pub const DEFAULT_MAX_ENTRIES: usize = 16;

/// Node fanout configuration.
///
/// Every node except the root holds between `min_entries` and `max_entries`
/// entries/children. `min_entries` must not exceed `max_entries / 2` so that
/// an overflowing node can always be split into two valid halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    min_entries: usize,
    max_entries: usize,
}

impl TreeOptions {
    /// Creates a validated fanout configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidConfiguration`] when `max_entries < 2`,
    /// `min_entries < 1`, or `min_entries > max_entries / 2`.
    pub fn new(min_entries: usize, max_entries: usize) -> TreeResult<Self> {
        if max_entries < 2 {
            log::error!("rejecting tree options: max_entries {} < 2", max_entries);
            return Err(TreeError::InvalidConfiguration(format!(
                "max_entries must be at least 2, got {}",
                max_entries
            )));
        }
        if min_entries < 1 {
            log::error!("rejecting tree options: min_entries is 0");
            return Err(TreeError::InvalidConfiguration(
                "min_entries must be at least 1".into(),
            ));
        }
        if min_entries > max_entries / 2 {
            log::error!(
                "rejecting tree options: min_entries {} > max_entries {} / 2",
                min_entries,
                max_entries
            );
            return Err(TreeError::InvalidConfiguration(format!(
                "min_entries {} must not exceed max_entries {} / 2",
                min_entries, max_entries
            )));
        }
        Ok(TreeOptions {
            min_entries,
            max_entries,
        })
    }

    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            min_entries: DEFAULT_MIN_ENTRIES,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let options = TreeOptions::default();
        assert_eq!(options.min_entries(), DEFAULT_MIN_ENTRIES);
        assert_eq!(options.max_entries(), DEFAULT_MAX_ENTRIES);
    }

    #[test]
    fn test_valid() {
        let options = TreeOptions::new(2, 4).unwrap();
        assert_eq!(options.min_entries(), 2);
        assert_eq!(options.max_entries(), 4);

        assert!(TreeOptions::new(1, 2).is_ok());
        assert!(TreeOptions::new(25, 64).is_ok());
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            TreeOptions::new(3, 4),
            Err(TreeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            TreeOptions::new(0, 4),
            Err(TreeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            TreeOptions::new(1, 1),
            Err(TreeError::InvalidConfiguration(_))
        ));
    }
}
