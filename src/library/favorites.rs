//! Favorites persisted as a JSON array of paths.
//!
//! ```text
//! [
//!   "images/beach.jpg",
//!   "images/garden.png"
//! ]
//! ```
//!
//! Every save rewrites the whole file.

use std::path::{Path, PathBuf};

use crate::playback::ItemId;

use super::{FavoritesStore, LibraryError};

pub struct JsonFavorites {
    path: PathBuf,
}

impl JsonFavorites {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FavoritesStore for JsonFavorites {
    fn load(&self) -> Vec<ItemId> {
        if !self.path.exists() {
            return Vec::new();
        }
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("favorites: cannot read {}: {e}", self.path.display());
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ItemId>>(&data) {
            Ok(items) => items,
            Err(e) => {
                log::warn!(
                    "favorites: {} is malformed, starting empty: {e}",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    fn save(&mut self, items: &[ItemId]) -> Result<(), LibraryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LibraryError::io(parent, e))?;
        }
        let data = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, data).map_err(|e| LibraryError::io(&self.path, e))?;
        log::debug!("favorites: saved {} entries", items.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in_temp() -> (JsonFavorites, tempfile::TempDir) {
        let dir = tempdir().expect("temp dir");
        let store = JsonFavorites::new(dir.path().join("favorites.json"));
        (store, dir)
    }

    #[test]
    fn absent_file_loads_empty() {
        let (store, _dir) = store_in_temp();
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let (store, _dir) = store_in_temp();
        std::fs::write(store.path(), "{ not json").expect("write");
        assert!(store.load().is_empty());
    }

    #[test]
    fn wrong_shape_loads_empty() {
        let (store, _dir) = store_in_temp();
        std::fs::write(store.path(), r#"{"a": 1}"#).expect("write");
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let (mut store, _dir) = store_in_temp();
        let items = vec![ItemId::from("b.png"), ItemId::from("a.jpg")];

        store.save(&items).expect("save");

        assert_eq!(store.load(), items);
    }

    #[test]
    fn save_rewrites_whole_file() {
        let (mut store, _dir) = store_in_temp();
        store
            .save(&[ItemId::from("a.png"), ItemId::from("b.png")])
            .expect("save");
        store.save(&[ItemId::from("c.png")]).expect("save");

        assert_eq!(store.load(), vec![ItemId::from("c.png")]);
    }

    #[test]
    fn reads_plain_json_array() {
        let (store, _dir) = store_in_temp();
        std::fs::write(store.path(), r#"["images/x.jpg", "images/y.png"]"#).expect("write");
        assert_eq!(
            store.load(),
            vec![ItemId::from("images/x.jpg"), ItemId::from("images/y.png")]
        );
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().expect("temp dir");
        let mut store = JsonFavorites::new(dir.path().join("nested").join("fav.json"));
        store.save(&[ItemId::from("a.png")]).expect("save");
        assert_eq!(store.load().len(), 1);
    }
}
