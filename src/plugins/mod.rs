//! Pipeline stages built on `core`: recommendation, per-destination
//! serialization, and the conflict and prune analyzers.

pub mod adapters;
pub mod fixer;
pub mod prune;
pub mod recommend;
