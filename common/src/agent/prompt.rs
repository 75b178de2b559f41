use crate::llm::Message;
use crate::schema::Database;

pub const QUERY_SYSTEM_PROMPT: &str =
    "you are a helpful assistant that writes sql. \
     answer with exactly one fenced code block tagged sql (```sql ... ```) \
     containing only the query. no alternatives, no second block.";

pub fn build_query_prompt(database: &Database, prompt: &str) -> String {
    format!(
        "I have a database named {} with the following schemas and columns:\n\
         {}\n\
         How can I generate an SQL query to {}?",
        database.name,
        database.context(),
        prompt
    )
}

pub fn build_query_messages(database: &Database, prompt: &str) -> Vec<Message> {
    vec![
        Message::system(QUERY_SYSTEM_PROMPT),
        Message::user(build_query_prompt(database, prompt)),
    ]
}
