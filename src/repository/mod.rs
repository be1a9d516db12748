pub mod database;
pub mod models;
pub mod owner_repository;

pub use database::Database;
pub use models::{OwnerRecord, StoredOwner};
pub use owner_repository::{OwnerRepository, OwnerStats};
