pub mod menu;
pub mod output;

pub use menu::select_database;
pub use output::write_artifact;

use crate::agent::QueryGenerator;
use crate::cache::{QueryCache, Resolution};
use crate::console::{ask_verbatim, ask_yes_no, Console};
use crate::error::{Result, SqlGenError};
use crate::schema::{Database, SchemaStore};
use std::path::PathBuf;

/// how a session bound to one database ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// operator wants to pick another database
    SwitchDatabase,
    Quit,
}

/// how a single prompt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Accepted { prompt: String, artifact: PathBuf },
    Abandoned,
}

enum Followup {
    Retry,
    Revise(String),
    Skip,
}

/// interactive prompt loop over one database at a time
///
/// the cache is owned here for the whole process lifetime and is written
/// through on every accept and invalidate.
pub struct GenerationSession<C: Console> {
    console: C,
    cache: QueryCache,
    generator: QueryGenerator,
    output_dir: PathBuf,
}

impl<C: Console> GenerationSession<C> {
    pub fn new(
        console: C,
        cache: QueryCache,
        generator: QueryGenerator,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            console,
            cache,
            generator,
            output_dir: output_dir.into(),
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// take prompts for `database` until the operator switches or quits
    #[tracing::instrument(skip(self, database), fields(db = %database.name))]
    pub async fn run(&mut self, database: &Database) -> Result<SessionEnd> {
        self.console.say(&format!("Using database {}.", database.name));

        loop {
            let prompt = match ask_verbatim(
                &mut self.console,
                "Input your prompt for SQL on how you would like to group your data (or type 'quit' to exit): ",
            ) {
                Ok(prompt) if prompt.trim().is_empty() => {
                    self.console.say("a prompt is required");
                    continue;
                }
                Ok(prompt) => prompt,
                Err(e) if e.is_abort() => return Ok(SessionEnd::Quit),
                Err(e) => return Err(e),
            };

            match self.handle_prompt(database, prompt).await {
                Ok(outcome) => tracing::debug!(?outcome, "prompt finished"),
                Err(e) if e.is_abort() => return Ok(SessionEnd::Quit),
                Err(e) => return Err(e),
            }

            match ask_yes_no(
                &mut self.console,
                "Would you like to continue with the current database? (yes/no/quit): ",
            ) {
                Ok(true) => continue,
                Ok(false) => return Ok(SessionEnd::SwitchDatabase),
                Err(e) if e.is_abort() => return Ok(SessionEnd::Quit),
                Err(e) => return Err(e),
            }
        }
    }

    /// drive one prompt through lookup, generation, acceptance and refinement
    pub async fn handle_prompt(&mut self, database: &Database, prompt: String) -> Result<PromptOutcome> {
        let mut prompt = prompt;

        loop {
            let resolution = match self.cache.resolve(database, &prompt, &self.generator).await {
                Ok(resolution) => resolution,
                Err(e @ (SqlGenError::Service(_) | SqlGenError::Extraction(_))) => {
                    tracing::warn!(error = %e, "generation failed");
                    self.console.say(&e.to_string());
                    match self.ask_followup(
                        "Press enter to retry, type a revised prompt, or 'skip' to move on (or type 'quit' to exit): ",
                    )? {
                        Followup::Retry => {}
                        Followup::Revise(revised) => prompt = revised,
                        Followup::Skip => return Ok(PromptOutcome::Abandoned),
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };

            let label = if resolution.is_hit() {
                "Cached SQL query:"
            } else {
                "Generated SQL query:"
            };
            self.console.say(label);
            self.console.say(resolution.query());

            if ask_yes_no(&mut self.console, "Accept this query? (yes/no): ")? {
                let query = resolution.query();
                if !resolution.is_hit() {
                    self.cache.accept(&prompt, query)?;
                }
                let artifact = write_artifact(&self.output_dir, query)?;
                self.console.say(&format!(
                    "Generated SQL code has been written to {}.",
                    artifact.display()
                ));
                return Ok(PromptOutcome::Accepted { prompt, artifact });
            }

            match resolution {
                Resolution::Hit(_) => {
                    self.cache.invalidate(&prompt)?;
                    tracing::info!("cached query rejected and invalidated");
                    match self.ask_followup(
                        "Type a revised prompt, press enter to generate a fresh query, or 'skip' to move on (or type 'quit' to exit): ",
                    )? {
                        Followup::Retry => {}
                        Followup::Revise(revised) => prompt = revised,
                        Followup::Skip => return Ok(PromptOutcome::Abandoned),
                    }
                }
                Resolution::Candidate(_) => {
                    match self.ask_followup(
                        "Type a revised prompt, or press enter to move on (or type 'quit' to exit): ",
                    )? {
                        Followup::Revise(revised) => prompt = revised,
                        Followup::Retry | Followup::Skip => return Ok(PromptOutcome::Abandoned),
                    }
                }
            }
        }
    }

    /// a revised prompt is kept verbatim since it becomes a cache key
    fn ask_followup(&mut self, question: &str) -> Result<Followup> {
        let answer = ask_verbatim(&mut self.console, question)?;
        let keyword = answer.trim();
        Ok(if keyword.is_empty() {
            Followup::Retry
        } else if keyword.eq_ignore_ascii_case("skip") {
            Followup::Skip
        } else {
            Followup::Revise(answer)
        })
    }
}

/// schema selection, then sessions, until the operator quits
pub async fn run_interactive<C: Console>(
    store: &mut SchemaStore,
    session: &mut GenerationSession<C>,
) -> Result<()> {
    loop {
        let database = match select_database(session.console_mut(), store) {
            Ok(database) => database,
            Err(e) if e.is_abort() => break,
            Err(e) => return Err(e),
        };

        if session.run(&database).await? == SessionEnd::Quit {
            break;
        }
    }

    session.console_mut().say("Exiting program...");
    Ok(())
}
