pub mod acquire;
pub mod store;
pub mod types;

pub use acquire::{ask_column_type, create_interactive};
pub use store::{DatabaseSummary, SchemaStore};
pub use types::{ColumnType, Database, Schema};
