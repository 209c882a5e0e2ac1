//! Image pool and favorites persistence.
//!
//! Both are traits so the kiosk can be exercised without a filesystem:
//!
//! | Trait | Production | Tests |
//! |-------|------------|-------|
//! | [`ImageLibrary`] | [`FolderLibrary`] — extension-filtered directory listing | `MockLibrary` |
//! | [`FavoritesStore`] | [`JsonFavorites`] — whole-file JSON array | `MockFavorites` |

pub mod favorites;
pub mod images;

pub use favorites::JsonFavorites;
pub use images::FolderLibrary;

use std::path::PathBuf;

use thiserror::Error;

use crate::playback::ItemId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the image pool or the favorites store.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode favorites: {0}")]
    Encode(#[from] serde_json::Error),
}

impl LibraryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LibraryError::Io {
            path: path.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// The pool of displayable images.
pub trait ImageLibrary: Send {
    /// Every image currently in the pool, in display order.
    fn list(&self) -> Result<Vec<ItemId>, LibraryError>;

    /// Delete the backing file of `item`.
    fn remove(&mut self, item: &ItemId) -> Result<(), LibraryError>;
}

/// Persistent favorites list.
pub trait FavoritesStore: Send {
    /// The stored list.  Absent or unreadable storage yields an empty list.
    fn load(&self) -> Vec<ItemId>;

    /// Replace the stored list with `items`.
    fn save(&mut self, items: &[ItemId]) -> Result<(), LibraryError>;
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// In-memory image pool.  `removed` records every deletion.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MockLibrary {
    pub items: std::sync::Arc<std::sync::Mutex<Vec<ItemId>>>,
    pub removed: std::sync::Arc<std::sync::Mutex<Vec<ItemId>>>,
}

#[cfg(test)]
impl MockLibrary {
    pub fn with(names: &[&str]) -> Self {
        let lib = Self::default();
        *lib.items.lock().unwrap() = names.iter().map(|n| ItemId::from(*n)).collect();
        lib
    }
}

#[cfg(test)]
impl ImageLibrary for MockLibrary {
    fn list(&self) -> Result<Vec<ItemId>, LibraryError> {
        Ok(self.items.lock().unwrap().clone())
    }

    fn remove(&mut self, item: &ItemId) -> Result<(), LibraryError> {
        self.items.lock().unwrap().retain(|i| i != item);
        self.removed.lock().unwrap().push(item.clone());
        Ok(())
    }
}

/// In-memory favorites.  `saves` counts calls to [`FavoritesStore::save`].
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MockFavorites {
    pub items: std::sync::Arc<std::sync::Mutex<Vec<ItemId>>>,
    pub saves: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

#[cfg(test)]
impl FavoritesStore for MockFavorites {
    fn load(&self) -> Vec<ItemId> {
        self.items.lock().unwrap().clone()
    }

    fn save(&mut self, items: &[ItemId]) -> Result<(), LibraryError> {
        *self.items.lock().unwrap() = items.to_vec();
        self.saves
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
