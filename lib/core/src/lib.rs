pub mod config;
pub mod error;
pub mod module;
pub mod slug;
pub mod types;

pub use config::StorageConfig;
pub use error::ServiceError;
pub use module::Module;
pub use slug::{new_slug, slugify};
pub use types::{ListParams, ListResult, is_recent, merge_patch, new_id, now_rfc3339, parse_rfc3339};
