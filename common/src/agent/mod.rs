pub mod executor;
pub mod parser;
pub mod prompt;

pub use executor::QueryGenerator;
pub use parser::extract_query;
pub use prompt::{build_query_messages, build_query_prompt, QUERY_SYSTEM_PROMPT};
