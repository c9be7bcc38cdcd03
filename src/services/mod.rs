pub mod representation;
pub mod storage;

pub use representation::Representer;
pub use storage::{LocalStorage, StorageBackend, StoredFile};
