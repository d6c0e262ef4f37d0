//! Models Module
//!
//! Value records stored in the cache and helpers for presenting their keys.

mod item;
mod keys;

pub use item::StorageItem;
pub use keys::compare_dotted;
