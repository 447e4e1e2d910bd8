mod error;
mod traits;

pub mod memory;

pub use error::StoreError;
pub use memory::MemoryMessageStore;
pub use traits::{MessageStore, Page, ResumeKey};
