use crate::agent::QueryGenerator;
use crate::error::Result;
use crate::persist::{load_json, save_json};
use crate::schema::Database;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// outcome of consulting the cache for one prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// previously accepted query
    Hit(String),
    /// freshly generated query, not persisted until accepted
    Candidate(String),
}

impl Resolution {
    pub fn query(&self) -> &str {
        match self {
            Resolution::Hit(q) | Resolution::Candidate(q) => q,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Resolution::Hit(_))
    }
}

/// durable prompt -> query mapping, keyed by exact prompt text
///
/// write-through: every accept and invalidate re-persists the whole map.
#[derive(Debug)]
pub struct QueryCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl QueryCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries: BTreeMap<String, String> = load_json(&path)?;
        tracing::info!(path = %path.display(), entries = entries.len(), "query cache loaded");
        Ok(Self { path, entries })
    }

    pub fn lookup(&self, prompt: &str) -> Option<&str> {
        self.entries.get(prompt).map(String::as_str)
    }

    /// cached query, or a generated candidate on a miss
    ///
    /// a failed generation leaves the cache untouched.
    #[tracing::instrument(skip(self, database, generator), fields(db = %database.name))]
    pub async fn resolve(
        &self,
        database: &Database,
        prompt: &str,
        generator: &QueryGenerator,
    ) -> Result<Resolution> {
        if let Some(query) = self.lookup(prompt) {
            tracing::debug!("cache hit");
            return Ok(Resolution::Hit(query.to_string()));
        }

        tracing::debug!("cache miss, generating");
        let query = generator.generate_query(database, prompt).await?;
        Ok(Resolution::Candidate(query))
    }

    /// persist `query` for `prompt`, replacing any earlier entry
    #[tracing::instrument(skip(self, query))]
    pub fn accept(&mut self, prompt: &str, query: &str) -> Result<()> {
        self.entries.insert(prompt.to_string(), query.to_string());
        self.save()
    }

    /// drop the entry for `prompt`; absent entries are not an error
    #[tracing::instrument(skip(self))]
    pub fn invalidate(&mut self, prompt: &str) -> Result<bool> {
        let removed = self.entries.remove(prompt).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// remove every entry
    pub fn clear(&mut self) -> Result<usize> {
        let count = self.entries.len();
        self.entries.clear();
        self.save()?;
        tracing::info!(count, "query cache cleared");
        Ok(count)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, q)| (p.as_str(), q.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<()> {
        save_json(&self.path, &self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::CannedGenerator;
    use crate::error::SqlGenError;
    use crate::schema::{ColumnType, Schema};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn shop() -> Database {
        let mut db = Database::new("shop");
        db.add_schema(
            "orders",
            Schema::from_columns([("id", ColumnType::Integer), ("total", ColumnType::Float)])
                .unwrap(),
        )
        .unwrap();
        db
    }

    #[test]
    fn test_accept_then_lookup() {
        let dir = tempdir().unwrap();
        let mut cache = QueryCache::open(dir.path().join("cache.json")).unwrap();

        for (prompt, query) in [
            ("count orders", "SELECT COUNT(*) FROM orders"),
            ("", ""),
            ("Count Orders", "SELECT count(id) FROM orders"),
        ] {
            cache.accept(prompt, query).unwrap();
            assert_eq!(cache.lookup(prompt), Some(query));
        }
        // prompts are case-sensitive keys
        assert_eq!(cache.lookup("count orders"), Some("SELECT COUNT(*) FROM orders"));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_accept_overwrites() {
        let dir = tempdir().unwrap();
        let mut cache = QueryCache::open(dir.path().join("cache.json")).unwrap();
        cache.accept("p", "SELECT 1").unwrap();
        cache.accept("p", "SELECT 2").unwrap();
        assert_eq!(cache.lookup("p"), Some("SELECT 2"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_then_miss() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = QueryCache::open(&path).unwrap();
        cache.accept("p", "SELECT 1").unwrap();

        assert!(cache.invalidate("p").unwrap());
        assert_eq!(cache.lookup("p"), None);
        assert!(!cache.invalidate("p").unwrap());

        let reloaded = QueryCache::open(&path).unwrap();
        assert_eq!(reloaded.lookup("p"), None);
    }

    #[test]
    fn test_persisted_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        {
            let mut cache = QueryCache::open(&path).unwrap();
            cache.accept("total sales per day", "SELECT 1\nFROM t").unwrap();
        }
        let cache = QueryCache::open(&path).unwrap();
        assert_eq!(cache.lookup("total sales per day"), Some("SELECT 1\nFROM t"));
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = QueryCache::open(&path).unwrap();
        cache.accept("a", "SELECT 1").unwrap();
        cache.accept("b", "SELECT 2").unwrap();

        assert_eq!(cache.clear().unwrap(), 2);
        assert!(QueryCache::open(&path).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_hit_skips_generator() {
        let dir = tempdir().unwrap();
        let mut cache = QueryCache::open(dir.path().join("cache.json")).unwrap();
        cache.accept("p", "SELECT 1").unwrap();

        let canned = Arc::new(CannedGenerator::new(["```sql\nSELECT 2\n```"]));
        let generator = QueryGenerator::new(canned.clone(), 1);

        let resolution = cache.resolve(&shop(), "p", &generator).await.unwrap();
        assert_eq!(resolution, Resolution::Hit("SELECT 1".to_string()));
        assert_eq!(canned.calls(), 0);
    }

    #[tokio::test]
    async fn test_resolve_miss_is_not_persisted() {
        let dir = tempdir().unwrap();
        let cache = QueryCache::open(dir.path().join("cache.json")).unwrap();

        let canned = Arc::new(CannedGenerator::new(["```sql\nSELECT 2\n```"]));
        let generator = QueryGenerator::new(canned.clone(), 1);

        let resolution = cache.resolve(&shop(), "p", &generator).await.unwrap();
        assert_eq!(resolution, Resolution::Candidate("SELECT 2".to_string()));
        assert_eq!(canned.calls(), 1);
        assert_eq!(cache.lookup("p"), None);
    }

    #[tokio::test]
    async fn test_resolve_extraction_failure_leaves_cache_alone() {
        let dir = tempdir().unwrap();
        let cache = QueryCache::open(dir.path().join("cache.json")).unwrap();

        let canned = Arc::new(CannedGenerator::new(["I cannot help with that."]));
        let generator = QueryGenerator::new(canned, 1);

        let err = cache.resolve(&shop(), "p", &generator).await.unwrap_err();
        assert!(matches!(err, SqlGenError::Extraction(_)));
        assert!(cache.is_empty());
    }
}
