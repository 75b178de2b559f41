use crate::error::{Result, SqlGenError};
use once_cell::sync::Lazy;
use regex::Regex;

// opening delimiter: ```sql (any case) alone on its line; ```sqlite and ```sql-92 are other tags
static OPEN_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)```sql[^\S\n]*(?:\n|$)").unwrap()
});

const CLOSE_FENCE: &str = "```";

/// pull the query out of the first ```sql block of a model response
pub fn extract_query(response: &str) -> Result<String> {
    let text = response.trim();

    if text.is_empty() {
        return Err(SqlGenError::Extraction(
            "model returned empty output".to_string(),
        ));
    }

    let open = OPEN_FENCE_REGEX.find(text).ok_or_else(|| {
        SqlGenError::Extraction("response did not contain a ```sql block".to_string())
    })?;

    let rest = &text[open.end()..];
    let close = rest.find(CLOSE_FENCE).ok_or_else(|| {
        SqlGenError::Extraction("```sql block was never closed".to_string())
    })?;

    let query = rest[..close].trim();
    if query.is_empty() {
        return Err(SqlGenError::Extraction("```sql block was empty".to_string()));
    }

    if OPEN_FENCE_REGEX.is_match(&rest[close + CLOSE_FENCE.len()..]) {
        tracing::warn!("response contained more than one sql block, using the first");
    }

    Ok(query.to_string())
}
