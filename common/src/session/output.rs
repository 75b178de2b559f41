use crate::error::Result;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const ARTIFACT_PREFIX: &str = "sql_output_";
const ARTIFACT_EXTENSION: &str = "sql";

/// write `query` (and nothing else) to a new timestamp-named file in `dir`
///
/// names look like `sql_output_2024-05-01_13-45-12.345.sql`; a `-N` suffix is
/// added when that name is already taken.
#[tracing::instrument(skip(query), fields(dir = %dir.display()))]
pub fn write_artifact(dir: &Path, query: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S%.3f").to_string();

    let mut attempt = 0usize;
    loop {
        let name = if attempt == 0 {
            format!("{}{}.{}", ARTIFACT_PREFIX, stamp, ARTIFACT_EXTENSION)
        } else {
            format!("{}{}-{}.{}", ARTIFACT_PREFIX, stamp, attempt, ARTIFACT_EXTENSION)
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(query.as_bytes())?;
                tracing::info!(path = %path.display(), "wrote query artifact");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_artifact_contains_only_query() {
        let dir = tempdir().unwrap();
        let path = write_artifact(dir.path(), "SELECT 1").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "SELECT 1");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("sql_output_"));
        assert!(name.ends_with(".sql"));
    }

    #[test]
    fn test_artifact_names_do_not_collide() {
        let dir = tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..5)
            .map(|i| write_artifact(dir.path(), &format!("SELECT {}", i)).unwrap())
            .collect();

        let mut unique = paths.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);
        for (i, path) in paths.iter().enumerate() {
            assert_eq!(fs::read_to_string(path).unwrap(), format!("SELECT {}", i));
        }
    }
}
