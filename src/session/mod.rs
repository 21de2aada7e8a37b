mod storage;
mod store;
mod token;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError, StorageKey};
pub use store::{Session, SessionStore};
