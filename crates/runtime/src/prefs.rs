//! Persisted dashboard preferences behind an injected key-value store.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use sf_views::{PageSize, SortKey};

pub const THEME_KEY: &str = "adminTheme";
pub const SORT_KEY: &str = "customerSort";
pub const PAGE_SIZE_KEY: &str = "customerPageSize";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("preference store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference store is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("preference store lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_: PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock()?.remove(key);
        Ok(())
    }
}

/// A flat JSON object on disk, replaced atomically on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Load `path` if it exists. A missing or undecodable file is an empty
    /// store; the next change overwrites it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries: BTreeMap<String, String> = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "preference store is corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "preference store opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(entries)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(raw.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock()?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Preferences are read once when constructed and written through on every
/// change. Unreadable stored values fall back to defaults.
pub struct Preferences<S: KvStore> {
    store: S,
    theme: Theme,
    sort: Option<SortKey>,
    page_size: Option<PageSize>,
}

impl<S: KvStore> Preferences<S> {
    pub fn load(store: S) -> Result<Self, StoreError> {
        let theme = match store.get(THEME_KEY)?.as_deref() {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        };
        let sort = store.get(SORT_KEY)?.and_then(|raw| match raw.parse::<SortKey>() {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(%err, "ignoring stored sort preference");
                None
            }
        });
        let page_size = store
            .get(PAGE_SIZE_KEY)?
            .and_then(|raw| match raw.parse::<PageSize>() {
                Ok(size) => Some(size),
                Err(err) => {
                    warn!(%err, "ignoring stored page size preference");
                    None
                }
            });

        let prefs = Self {
            store,
            theme,
            sort,
            page_size,
        };
        prefs.store.set(THEME_KEY, prefs.theme.as_str())?;
        Ok(prefs)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    pub fn page_size(&self) -> Option<PageSize> {
        self.page_size
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.theme = theme;
        self.store.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, StoreError> {
        let next = self.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    pub fn set_sort(&mut self, sort: Option<SortKey>) -> Result<(), StoreError> {
        self.sort = sort;
        match sort {
            Some(key) => self.store.set(SORT_KEY, key.as_str()),
            None => self.store.remove(SORT_KEY),
        }
    }

    pub fn set_page_size(&mut self, page_size: PageSize) -> Result<(), StoreError> {
        self.page_size = Some(page_size);
        self.store.set(PAGE_SIZE_KEY, &page_size.to_string())
    }
}
