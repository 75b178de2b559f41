use crate::agent::parser::extract_query;
use crate::agent::prompt::build_query_messages;
use crate::error::{Result, SqlGenError};
use crate::llm::Generator;
use crate::schema::Database;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// schema-aware front of a `Generator`
///
/// service failures are retried up to `max_attempts` with a linear backoff.
/// an extraction failure means the service answered, so it is returned as is.
#[derive(Clone)]
pub struct QueryGenerator {
    generator: Arc<dyn Generator>,
    max_attempts: usize,
    backoff: Duration,
}

impl QueryGenerator {
    pub fn new(generator: Arc<dyn Generator>, max_attempts: usize) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    #[tracing::instrument(skip(self, database), fields(db = %database.name, max_attempts = self.max_attempts))]
    pub async fn generate_query(&self, database: &Database, prompt: &str) -> Result<String> {
        let messages = build_query_messages(database, prompt);
        let mut last_error: Option<SqlGenError> = None;

        for attempt in 1..=self.max_attempts {
            match self.generator.complete(messages.clone()).await {
                Ok(response) => {
                    let query = extract_query(&response)?;
                    tracing::info!(attempt, chars = query.len(), "query generated");
                    return Ok(query);
                }
                Err(e @ SqlGenError::Service(_)) => {
                    tracing::warn!("generation attempt {}/{} failed: {}", attempt, self.max_attempts, e);
                    last_error = Some(e);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff * attempt as u32).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SqlGenError::Service(format!(
                "generation failed after {} attempts",
                self.max_attempts
            ))
        }))
    }
}
