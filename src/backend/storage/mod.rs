//! Storage abstraction and its file-backed implementation.

pub mod csv;
pub mod traits;

pub use traits::{AccountStore, IdAllocator, ServiceStore, TransactionStore};
