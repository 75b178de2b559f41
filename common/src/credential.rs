use crate::error::{Result, SqlGenError};
use std::env;
use std::fmt;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// secret for the generation service; never printed
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn from_env() -> Result<Self> {
        Self::from_var(API_KEY_VAR)
    }

    pub fn from_var(name: &str) -> Result<Self> {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
            .ok_or_else(|| SqlGenError::MissingCredential(name.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
