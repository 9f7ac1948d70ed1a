//! Provides implementations of multiple stores.

#[cfg(feature = "alloc")]
mod heap_store;
mod inline_slab_store;

#[cfg(feature = "alloc")]
pub use heap_store::HeapStore;
pub use inline_slab_store::InlineSlabStore;
