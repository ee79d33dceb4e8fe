//! # Shared
//! The ambient components shared by the backup tool and its tests.
//!

#![warn(missing_docs)]

mod failure;
mod logger;

pub use failure::Failure;
pub use logger::{LoggerError, init_logger};
