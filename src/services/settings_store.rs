use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::error::{CoreError, CoreResult};

pub const KEY_CONTEXTS: &str = "context_keywords";
pub const KEY_DICTIONARY: &str = "personal_dictionary";

/// Key/value persistence collaborator.
///
/// Values are opaque JSON; callers own their shape.
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value) -> CoreResult<()>;

    /// Writes several keys as one update. Backends that persist should make
    /// this a single write so related keys never disagree on disk.
    fn set_many(&mut self, values: Vec<(&str, Value)>) -> CoreResult<()> {
        for (key, value) in values {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// All keys in a single pretty-printed JSON object, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Opens `path`. A missing file is an empty store; an unreadable or
    /// non-object file is logged and also treated as empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = read_document(&path);
        JsonFileStore { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(&self.values)?;
        write_atomic(&self.path, json.as_bytes())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> CoreResult<()> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    fn set_many(&mut self, values: Vec<(&str, Value)>) -> CoreResult<()> {
        for (key, value) in values {
            self.values.insert(key.to_string(), value);
        }
        self.persist()
    }
}

fn read_document(path: &Path) -> Map<String, Value> {
    if !path.exists() {
        return Map::new();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("failed to read {}: {e}", path.display());
            return Map::new();
        }
    };

    if data.trim().is_empty() {
        return Map::new();
    }

    match serde_json::from_str::<Value>(&data) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            log::warn!("{} is not a JSON object, starting empty", path.display());
            Map::new()
        }
        Err(e) => {
            log::warn!("failed to parse {}: {e}", path.display());
            Map::new()
        }
    }
}

/// In-process store; nothing touches the disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    /// Number of writes so far; a `set_many` counts once.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> CoreResult<()> {
        self.values.insert(key.to_string(), value);
        self.writes += 1;
        Ok(())
    }

    fn set_many(&mut self, values: Vec<(&str, Value)>) -> CoreResult<()> {
        for (key, value) in values {
            self.values.insert(key.to_string(), value);
        }
        self.writes += 1;
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(store_err)?;
        }
    }

    fs::write(&tmp, bytes).map_err(store_err)?;

    if path.exists() {
        fs::remove_file(path).map_err(store_err)?;
    }

    fs::rename(&tmp, path).map_err(store_err)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "settings".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

fn store_err(e: std::io::Error) -> CoreError {
    CoreError::Store(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tmp_path_sits_next_to_target() {
        let p = tmp_path(Path::new("/data/settings.json"));
        assert_eq!(p, PathBuf::from("/data/settings.json.tmp"));
    }

    #[test]
    fn memory_store_counts_writes() {
        let mut store = MemoryStore::new();
        assert!(store.get("default_to").is_none());

        store.set("default_to", json!("he")).unwrap();
        store.set("default_to", json!("en")).unwrap();

        assert_eq!(store.get("default_to"), Some(json!("en")));
        assert_eq!(store.writes(), 2);
    }

    #[test]
    fn set_many_is_one_write() {
        let mut store = MemoryStore::new();
        store
            .set_many(vec![("default_from", json!("en")), ("default_to", json!("he"))])
            .unwrap();

        assert_eq!(store.writes(), 1);
        assert_eq!(store.get("default_from"), Some(json!("en")));
        assert_eq!(store.get("default_to"), Some(json!("he")));
    }
}
