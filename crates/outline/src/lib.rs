//! Outline generation against an OpenAI-compatible chat API.

pub mod client;

pub use client::{GeneratorConfig, OpenAiGenerator, StaticOutlineGenerator};
