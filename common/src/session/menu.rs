use crate::console::{ask, ask_count, ask_name, ask_with, ask_yes_no, Console};
use crate::error::{Result, SqlGenError};
use crate::schema::{ask_column_type, create_interactive, Database, SchemaStore};

/// choose the database the next session binds to
///
/// returns `UserAborted` when the operator quits at the menu (or while
/// describing the very first database).
pub fn select_database(console: &mut dyn Console, store: &mut SchemaStore) -> Result<Database> {
    loop {
        if store.is_empty() {
            console.say("No stored databases yet, describe one to get started.");
            return create_and_offer_save(console, store);
        }

        console.say("Stored databases:");
        for summary in store.list() {
            console.say(&summary.to_string());
        }

        let answer = ask(
            console,
            "Select a database by number, 'new' to describe another, or 'edit' to change a column (or type 'quit' to exit): ",
        )?;

        match answer.to_lowercase().as_str() {
            "new" => match create_and_offer_save(console, store) {
                Ok(database) => return Ok(database),
                Err(e) if e.is_abort() => console.say("Discarded the new database."),
                Err(e) => return Err(e),
            },
            "edit" => match edit_column_interactive(console, store) {
                Ok(()) => console.say("Column updated."),
                Err(e) if e.is_abort() => console.say("Edit cancelled."),
                Err(e) if e.is_recoverable() => console.say(&e.to_string()),
                Err(e) => return Err(e),
            },
            other => {
                let selected = other
                    .parse::<usize>()
                    .map_err(|_| SqlGenError::InvalidInput(format!("'{}' is not a choice", other)))
                    .and_then(|index| store.select(index).cloned());
                match selected {
                    Ok(database) => return Ok(database),
                    Err(e) => console.say(&e.to_string()),
                }
            }
        }
    }
}

fn create_and_offer_save(console: &mut dyn Console, store: &mut SchemaStore) -> Result<Database> {
    let database = create_interactive(console)?;
    if ask_yes_no(console, "Save this database for later sessions? (yes/no): ")? {
        store.persist_append(database.clone())?;
        console.say(&format!("Saved {} as #{}.", database.name, store.len()));
    }
    Ok(database)
}

fn edit_column_interactive(console: &mut dyn Console, store: &mut SchemaStore) -> Result<()> {
    let index = ask_count(console, "Database number: ")?;
    let schema = ask_name(console, "Schema name: ")?;
    let old_column = ask_name(console, "Column to change: ")?;
    let new_column = ask_with(
        console,
        "New column name (leave blank to keep it): ",
        |answer| {
            Ok(if answer.is_empty() {
                old_column.clone()
            } else {
                answer.to_string()
            })
        },
    )?;
    let new_type = ask_column_type(console)?;

    store.edit_column(index, &schema, &old_column, &new_column, new_type)
}
