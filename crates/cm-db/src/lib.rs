pub mod error;
pub mod event_repo;
pub mod file_store;
pub mod resources;

pub use crate::error::DbError;
pub use crate::event_repo::{FileEventRepository, STORED_EVENTS};
pub use crate::file_store::JsonFileStore;
pub use crate::resources::Resources;
