//! Runtime that executes flow effects against real collaborators

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{Collaborators, FlowRuntime, RuntimeError};
pub use traits::*;
