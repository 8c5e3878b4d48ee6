//! Core types and the analysis primitives shared by every command.
//!
//! Filesystem access is limited to loaders (`config`, `snapshot`,
//! `ProjectFiles::from_root`) and `workspace`; everything else works on values.

pub mod config;
pub mod contract;
pub mod error;
pub mod frontmatter;
pub mod globs;
pub mod model;
pub mod output;
pub mod reporter;
pub mod snapshot;
pub mod tokens;
pub mod validate;
pub mod workspace;
