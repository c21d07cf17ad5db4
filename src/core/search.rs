//! Name matching for the tree filter.

use std::path::Path;

/// A utility struct for matching paths against the tree filter.
///
/// This struct is stateless and provides methods as associated functions.
pub struct SearchEngine;

impl SearchEngine {
    /// Checks if a path matches the filter substring.
    ///
    /// An empty filter matches everything. Otherwise the path's own name must contain
    /// the filter, both compared lower-cased. This is plain containment, not a glob.
    pub fn matches_filter(path: &Path, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        Self::matches_search_query(path, &filter.to_lowercase())
    }

    /// Like [`SearchEngine::matches_filter`], but an empty filter matches nothing.
    ///
    /// Used to highlight the nodes that matched on their own rather than through
    /// the ancestor closure.
    pub fn is_highlighted(path: &Path, filter: &str) -> bool {
        !filter.is_empty() && Self::matches_search_query(path, &filter.to_lowercase())
    }

    /// Checks if a path's name contains an already lower-cased query.
    fn matches_search_query(path: &Path, query_lower: &str) -> bool {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        file_name.contains(query_lower)
    }
}
