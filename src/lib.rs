//! Filter a directory tree, pick files and folders, and aggregate their text content
//! into labeled, fenced blocks.
//!
//! [`core`] holds the stateless engine. [`app`] wraps it in shared state, command
//! handlers and a background worker for front ends such as the `fca` binary.

pub mod app;
pub mod config;
pub mod core;
pub mod utils;
