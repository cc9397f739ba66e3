//! News text classification backed by an LLM.
//!
//! `analysis` holds the pure core (prompt building and reply interpretation);
//! everything else is plumbing around one Gemini call per text.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detector;
pub mod errors;
pub mod llm_client;
pub mod routes;
pub mod state;
