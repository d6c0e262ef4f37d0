//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Curator: Removes expired cache entries at configured intervals

mod curator;

pub use curator::Curator;
