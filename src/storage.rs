use crate::model::{TodoItem, TodoList};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

pub const TODOS_KEY: &str = "todos";

pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no usable data directory")]
    NoDataDir,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open_default() -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("", "", "dayplan").ok_or(StoreError::NoDataDir)?;
        Ok(FileStore {
            dir: dirs.data_dir().to_path_buf(),
        })
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Read { path, source: err }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|err| StoreError::Write {
            path: self.dir.clone(),
            source: err,
        })?;
        fs::write(&path, value).map_err(|err| StoreError::Write { path, source: err })
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// Loading never fails: an unreadable or malformed value is logged and
// replaced by an empty list.
pub fn load_todos(store: &impl Store) -> TodoList {
    let raw = match store.get(TODOS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return TodoList::default(),
        Err(err) => {
            log::warn!("unable to read saved todos: {}", err);
            return TodoList::default();
        }
    };
    match serde_json::from_str::<Vec<TodoItem>>(&raw) {
        Ok(items) => TodoList::from_items(items),
        Err(err) => {
            log::warn!("discarding malformed todo data: {}", err);
            TodoList::default()
        }
    }
}

pub fn save_todos(store: &mut impl Store, todos: &TodoList) -> Result<()> {
    let serialized = serde_json::to_string(todos.items()).context("serializing todos")?;
    store
        .set(TODOS_KEY, &serialized)
        .context("storing todos")?;
    Ok(())
}
