pub mod memory_repo;
pub mod sqlite_repo;

pub use memory_repo::MemoryRegistry;
pub use sqlite_repo::SqliteRegistry;
