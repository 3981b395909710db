//! Momenta — moment classification and semantic retrieval engine.
//!
//! The crate is the text-understanding core of a single-user journal: free
//! text goes in, organized topic threads, semantic search results, and a
//! cached daily digest come out. Every remote-model call degrades to a
//! documented deterministic path, so the engine never fails the caller on
//! network weather.

pub mod classify;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod intent;
pub mod llm;
pub mod models;
pub mod search;
pub mod services;
pub mod summary;

pub use config::Config;
pub use error::{MomentaError, Result};
