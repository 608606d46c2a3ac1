//! # Story Bible
//!
//! The "Story Bible" crate - contains the vocabulary shared between the context engine
//! and the persistence layer: story inputs, characters, structure templates, and the
//! persisted project record. This crate is the single source of truth for stored story
//! data and does not contain any generation logic.

pub mod entities;
mod lenient;
pub mod project;
pub mod template;

pub use entities::*;
pub use project::*;
pub use template::*;
