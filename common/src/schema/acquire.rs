use crate::console::{ask_count, ask_name, ask_with, Console};
use crate::error::{Result, SqlGenError};
use crate::schema::types::{ColumnType, Database, Schema};

/// walk the operator through a brand-new database definition
///
/// the quit sentinel at any depth aborts with `UserAborted` and nothing of the
/// pending database survives. invalid counts, names and types are re-asked.
#[tracing::instrument(skip(console))]
pub fn create_interactive(console: &mut dyn Console) -> Result<Database> {
    let name = ask_name(
        console,
        "Enter the name of the database (or type 'quit' to exit): ",
    )?;
    let mut database = Database::new(name);

    let schema_count = ask_count(
        console,
        "Enter how many schemas are in the database (or type 'quit' to exit): ",
    )?;

    for _ in 0..schema_count {
        let schema_name = ask_with(
            console,
            "Enter the schema name (or type 'quit' to exit): ",
            |answer| {
                if answer.is_empty() {
                    Err(SqlGenError::InvalidInput("a name is required".to_string()))
                } else if database.schema(answer).is_some() {
                    Err(SqlGenError::InvalidInput(format!(
                        "schema '{}' already exists in this database",
                        answer
                    )))
                } else {
                    Ok(answer.to_string())
                }
            },
        )?;

        let schema = acquire_schema(console, &schema_name)?;
        database.add_schema(schema_name, schema)?;
    }

    tracing::info!(
        name = %database.name,
        schemas = database.schema_count(),
        "database definition acquired"
    );
    Ok(database)
}

fn acquire_schema(console: &mut dyn Console, schema_name: &str) -> Result<Schema> {
    let column_count = ask_count(
        console,
        &format!(
            "How many columns are in the {} schema? (or type 'quit' to exit): ",
            schema_name
        ),
    )?;

    let mut schema = Schema::new();
    for _ in 0..column_count {
        let column_name = ask_with(
            console,
            "Enter column name (or type 'quit' to exit): ",
            |answer| {
                if answer.is_empty() {
                    Err(SqlGenError::InvalidInput("a name is required".to_string()))
                } else if schema.contains(answer) {
                    Err(SqlGenError::InvalidInput(format!(
                        "column '{}' already exists in {}",
                        answer, schema_name
                    )))
                } else {
                    Ok(answer.to_string())
                }
            },
        )?;

        let column_type = ask_column_type(console)?;
        schema.add_column(column_name, column_type)?;
    }

    Ok(schema)
}

pub fn ask_column_type(console: &mut dyn Console) -> Result<ColumnType> {
    ask_with(
        console,
        "Is this column string, float, integer or date? (or type 'quit' to exit): ",
        |answer| answer.parse::<ColumnType>(),
    )
}
