use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// read a json document, falling back to `T::default()` when the file is absent
pub fn load_json<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no persisted state, starting empty");
        return Ok(T::default());
    }

    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(T::default());
    }

    Ok(serde_json::from_str(&text)?)
}

/// write the whole document through a temp file and rename it into place
pub fn save_json<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    let json = serde_json::to_string_pretty(value)?;
    fs::write(temp_path, json)?;
    fs::rename(temp_path, path)?;

    tracing::debug!(path = %path.display(), "persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_default() {
        let dir = tempdir().unwrap();
        let loaded: Vec<String> = load_json(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_creates_parent_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut value = BTreeMap::new();
        value.insert("k".to_string(), "v".to_string());
        save_json(&path, &value).unwrap();

        let loaded: BTreeMap<String, String> = load_json(&path).unwrap();
        assert_eq!(loaded, value);
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
    }
}
