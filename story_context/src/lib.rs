//! # Story Context (The Loom)
//!
//! Builds the context for each call in a multi-stage story generation pipeline
//! (story -> acts -> plot points -> scenes) and renders it into a single directive for
//! a text model. This crate reads the `story_bible` vocabulary and never generates or
//! persists content itself.
//!
//! ## Core Components
//!
//! - **order_resolver**: Chronological unit order for known templates
//! - **distribution**: Scenes per plot point from the story's scene budget
//! - **chain**: The five-level context chain and its builder
//! - **causality**: Causal history reconstructed from persisted earlier acts
//! - **prompt_assembler**: Renders a chain into a directive string
//! - **gate**: Per-project serialization of generation requests
//!
//! ## Design Philosophy
//!
//! - **Request-Scoped**: Every generation request builds its own chain; nothing is shared
//! - **Order-Driven**: History follows resolved story order, never storage order
//! - **Forgiving Reads**: Earlier acts may be incomplete; missing data is skipped, not fatal

pub mod causality;
pub mod chain;
pub mod config;
pub mod distribution;
pub mod error;
pub mod gate;
pub mod generation;
pub mod logging;
pub mod order_resolver;
pub mod prompt_assembler;

pub use causality::*;
pub use chain::*;
pub use config::*;
pub use distribution::*;
pub use error::*;
pub use gate::*;
pub use generation::*;
pub use order_resolver::*;
pub use prompt_assembler::*;
