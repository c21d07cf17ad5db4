//! The filtering and aggregation engine.
//!
//! Every operation here works on request-scoped values passed in by the caller and
//! holds no state between calls.

pub mod error;
pub mod file_handler;
pub mod ignore;
pub mod scanner;
pub mod search;
pub mod selection;
pub mod tree_generator;

use std::collections::HashSet;
use std::path::PathBuf;

/// Paths visible for one (root, filter) pair. Closed under ancestors up to the root.
pub type VisiblePathSet = HashSet<PathBuf>;

/// Files and directories picked by the caller.
pub type SelectionSet = HashSet<PathBuf>;

pub use error::CoreError;
pub use file_handler::{AggregationResult, FileHandler};
pub use scanner::DirectoryScanner;
pub use search::SearchEngine;
pub use selection::{DirectoryError, DirectoryErrorKind, ResolvedFiles, SelectionExpander};
pub use tree_generator::{TreeEntry, TreeGenerator};
