//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the engine.
//!
//! # Tasks
//! - Sweeper: Removes expired cache entries at the configured interval

mod sweeper;

pub use sweeper::Sweeper;
