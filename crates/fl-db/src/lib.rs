pub mod knowledge_repo;
pub mod request_repo;
pub mod schema;
pub mod store;
pub mod util;

pub use crate::store::DbStore;
