//! Appointment field extraction backed by a local language model

pub mod client;
pub mod extraction;

pub use client::OllamaClient;
pub use extraction::{INSTRUCTIONS, LlmExtractor};
