pub mod catalog;

pub use catalog::JsonCatalog;
