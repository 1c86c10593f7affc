//! Dataport Common Library
//!
//! Shared error handling and logging bootstrap for the Dataport workspace.
//!
//! - **Error Handling**: the [`DataportError`] type and [`Result`] alias used
//!   across workspace members.
//! - **Logging**: tracing-based logging initialization with configurable
//!   level, output target, and format (see [`logging`]).

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{DataportError, Result};
