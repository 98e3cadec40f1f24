pub mod memory;
pub mod postgres;

pub use memory::InMemoryLinkStore;
pub use postgres::{PostgresLinkStore, PostgresSettings};
pub use tether_core::repository::{LinkRecord, LinkStore, ReadLinkStore};
pub use tether_core::StorageError;
