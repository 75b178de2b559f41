use crate::error::{Result, SqlGenError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Float,
    Integer,
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Float => "float",
            ColumnType::Integer => "integer",
            ColumnType::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = SqlGenError;

    fn from_str(s: &str) -> Result<Self> {
        // plural forms are what operators tend to type at the prompt
        match s.trim().to_lowercase().as_str() {
            "string" | "strings" => Ok(ColumnType::String),
            "float" | "floats" => Ok(ColumnType::Float),
            "integer" | "integers" => Ok(ColumnType::Integer),
            "date" | "dates" => Ok(ColumnType::Date),
            other => Err(SqlGenError::InvalidInput(format!(
                "unknown column type '{}' (expected string, float, integer or date)",
                other
            ))),
        }
    }
}

/// named set of typed columns; column names are unique
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: BTreeMap<String, ColumnType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// build from pairs, rejecting the first repeated column name
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        let mut schema = Self::new();
        for (name, column_type) in columns {
            schema.add_column(name, column_type)?;
        }
        Ok(schema)
    }

    pub fn add_column(&mut self, name: impl Into<String>, column_type: ColumnType) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(SqlGenError::DuplicateColumn(name));
        }
        self.columns.insert(name, column_type);
        Ok(())
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// rename and/or retype one column; same name degenerates to a type change
    pub fn replace_column(&mut self, old: &str, new: &str, column_type: ColumnType) -> Result<()> {
        if new.trim().is_empty() {
            return Err(SqlGenError::InvalidInput("a column name is required".to_string()));
        }
        if !self.columns.contains_key(old) {
            return Err(SqlGenError::ColumnNotFound(old.to_string()));
        }
        if old != new && self.columns.contains_key(new) {
            return Err(SqlGenError::DuplicateColumn(new.to_string()));
        }
        self.columns.remove(old);
        self.columns.insert(new.to_string(), column_type);
        Ok(())
    }

    /// `a (integer), b (float)`
    pub fn describe(&self) -> String {
        self.columns
            .iter()
            .map(|(name, column_type)| format!("{} ({})", name, column_type))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    schemas: BTreeMap<String, Schema>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemas: BTreeMap::new(),
        }
    }

    pub fn add_schema(&mut self, name: impl Into<String>, schema: Schema) -> Result<()> {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return Err(SqlGenError::DuplicateSchema(name));
        }
        self.schemas.insert(name, schema);
        Ok(())
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn schema_mut(&mut self, name: &str) -> Option<&mut Schema> {
        self.schemas.get_mut(name)
    }

    pub fn schemas(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// one line per schema in stored order: `orders: id (integer), total (float)`
    pub fn context(&self) -> String {
        self.schemas
            .iter()
            .map(|(name, schema)| format!("{}: {}", name, schema.describe()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_parsing() {
        assert_eq!("integer".parse::<ColumnType>().unwrap(), ColumnType::Integer);
        assert_eq!(" Floats ".parse::<ColumnType>().unwrap(), ColumnType::Float);
        assert_eq!("DATE".parse::<ColumnType>().unwrap(), ColumnType::Date);
    }

    #[test]
    fn test_column_type_rejects_boolean() {
        let err = "boolean".parse::<ColumnType>().unwrap_err();
        assert!(matches!(err, SqlGenError::InvalidInput(_)));
    }

    #[test]
    fn test_column_type_serializes_lowercase() {
        let json = serde_json::to_string(&ColumnType::Integer).unwrap();
        assert_eq!(json, "\"integer\"");
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = Schema::from_columns([("id", ColumnType::Integer), ("id", ColumnType::String)]);
        assert!(matches!(result, Err(SqlGenError::DuplicateColumn(name)) if name == "id"));

        let mut schema = Schema::new();
        schema.add_column("id", ColumnType::Integer).unwrap();
        assert!(schema.add_column("id", ColumnType::Float).is_err());
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.column_type("id"), Some(ColumnType::Integer));
    }

    #[test]
    fn test_replace_column_rename_and_retype() {
        let mut schema = Schema::from_columns([
            ("name", ColumnType::String),
            ("age", ColumnType::Integer),
            ("joined", ColumnType::Date),
        ])
        .unwrap();

        schema.replace_column("age", "age_years", ColumnType::Float).unwrap();

        assert!(!schema.contains("age"));
        assert_eq!(schema.column_type("age_years"), Some(ColumnType::Float));
        assert_eq!(schema.column_type("name"), Some(ColumnType::String));
        assert_eq!(schema.column_type("joined"), Some(ColumnType::Date));
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_replace_column_onto_existing_name_fails() {
        let mut schema =
            Schema::from_columns([("a", ColumnType::String), ("b", ColumnType::String)]).unwrap();
        let err = schema.replace_column("a", "b", ColumnType::Date).unwrap_err();
        assert!(matches!(err, SqlGenError::DuplicateColumn(_)));
        assert_eq!(schema.column_type("a"), Some(ColumnType::String));
    }

    #[test]
    fn test_replace_column_rejects_blank_name() {
        let mut schema = Schema::from_columns([("a", ColumnType::String)]).unwrap();
        for blank in ["", "   "] {
            let err = schema.replace_column("a", blank, ColumnType::Date).unwrap_err();
            assert!(matches!(err, SqlGenError::InvalidInput(_)));
        }
        assert_eq!(schema.column_type("a"), Some(ColumnType::String));
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_database_context() {
        let mut db = Database::new("shop");
        db.add_schema(
            "orders",
            Schema::from_columns([("id", ColumnType::Integer), ("total", ColumnType::Float)])
                .unwrap(),
        )
        .unwrap();
        db.add_schema(
            "customers",
            Schema::from_columns([("email", ColumnType::String)]).unwrap(),
        )
        .unwrap();

        assert_eq!(
            db.context(),
            "customers: email (string)\norders: id (integer), total (float)"
        );
    }

    #[test]
    fn test_duplicate_schema_rejected() {
        let mut db = Database::new("shop");
        db.add_schema("orders", Schema::new()).unwrap();
        assert!(matches!(
            db.add_schema("orders", Schema::new()),
            Err(SqlGenError::DuplicateSchema(_))
        ));
    }
}
