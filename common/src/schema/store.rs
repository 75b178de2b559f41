use crate::error::{Result, SqlGenError};
use crate::persist::{load_json, save_json};
use crate::schema::types::{ColumnType, Database};
use std::fmt;
use std::path::{Path, PathBuf};

/// display view of one stored database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSummary {
    pub index: usize,
    pub name: String,
    pub schemas: Vec<(String, Vec<String>)>,
}

impl fmt::Display for DatabaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.index, self.name)?;
        for (schema, columns) in &self.schemas {
            write!(f, "\n   {}: {}", schema, columns.join(", "))?;
        }
        Ok(())
    }
}

/// durable, ordered collection of database descriptions
///
/// every mutation re-persists the whole sequence. duplicate database names are
/// allowed; uniqueness is only enforced for schemas within a database and
/// columns within a schema.
#[derive(Debug)]
pub struct SchemaStore {
    path: PathBuf,
    databases: Vec<Database>,
}

impl SchemaStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let databases: Vec<Database> = load_json(&path)?;
        tracing::info!(path = %path.display(), count = databases.len(), "schema store loaded");
        Ok(Self { path, databases })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn databases(&self) -> &[Database] {
        &self.databases
    }

    pub fn list(&self) -> Vec<DatabaseSummary> {
        self.databases
            .iter()
            .enumerate()
            .map(|(i, db)| DatabaseSummary {
                index: i + 1,
                name: db.name.clone(),
                schemas: db
                    .schemas()
                    .map(|(name, schema)| {
                        (
                            name.to_string(),
                            schema.columns().map(|(c, _)| c.to_string()).collect(),
                        )
                    })
                    .collect(),
            })
            .collect()
    }

    /// 1-based lookup
    pub fn select(&self, index: usize) -> Result<&Database> {
        self.position(index).map(|i| &self.databases[i])
    }

    #[tracing::instrument(skip(self, database), fields(name = %database.name))]
    pub fn persist_append(&mut self, database: Database) -> Result<()> {
        self.databases.push(database);
        self.save()?;
        tracing::info!(count = self.databases.len(), "database appended");
        Ok(())
    }

    /// rename and/or retype a single column, then re-persist
    ///
    /// on any lookup failure the store is left untouched.
    #[tracing::instrument(skip(self))]
    pub fn edit_column(
        &mut self,
        database_index: usize,
        schema_name: &str,
        old_column: &str,
        new_column: &str,
        new_type: ColumnType,
    ) -> Result<()> {
        let i = self.position(database_index)?;
        let schema = self.databases[i]
            .schema_mut(schema_name)
            .ok_or_else(|| SqlGenError::SchemaNotFound(schema_name.to_string()))?;

        schema.replace_column(old_column, new_column, new_type)?;
        self.save()?;

        tracing::info!("column updated");
        Ok(())
    }

    fn position(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.databases.len() {
            return Err(SqlGenError::OutOfRange {
                index,
                count: self.databases.len(),
            });
        }
        Ok(index - 1)
    }

    fn save(&self) -> Result<()> {
        save_json(&self.path, &self.databases)
    }
}
