//! Command Line Interface for the verdict sentiment classifier.

pub mod args;
pub mod commands;
pub mod interactive;
pub mod output;

// Re-export commonly used types
pub use args::*;
pub use commands::*;
pub use interactive::*;
pub use output::*;
