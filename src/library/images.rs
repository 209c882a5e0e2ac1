//! Directory-backed image pool.

use std::path::{Path, PathBuf};

use crate::config::SlideshowConfig;
use crate::playback::ItemId;

use super::{ImageLibrary, LibraryError};

/// Lists the files of one folder whose extension is in an allow-list.
///
/// Extensions are compared case-insensitively; results are sorted by path so
/// the slideshow order is stable across restarts.  Sub-directories are not
/// descended into.
#[derive(Debug, Clone)]
pub struct FolderLibrary {
    folder: PathBuf,
    extensions: Vec<String>,
}

impl FolderLibrary {
    pub fn new(folder: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            folder: folder.into(),
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(cfg: &SlideshowConfig) -> Self {
        Self::new(&cfg.image_folder, &cfg.extensions)
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .is_some_and(|e| self.extensions.iter().any(|x| *x == e))
    }
}

impl ImageLibrary for FolderLibrary {
    fn list(&self) -> Result<Vec<ItemId>, LibraryError> {
        let entries =
            std::fs::read_dir(&self.folder).map_err(|e| LibraryError::io(&self.folder, e))?;

        let mut items: Vec<ItemId> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && self.accepts(path))
            .collect();
        items.sort();

        log::debug!("library: {} images in {}", items.len(), self.folder.display());
        Ok(items)
    }

    fn remove(&mut self, item: &ItemId) -> Result<(), LibraryError> {
        std::fs::remove_file(item).map_err(|e| LibraryError::io(item, e))?;
        log::info!("library: deleted {}", item.display());
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

    fn exts() -> Vec<String> {
        vec!["png".into(), "jpg".into(), "jpeg".into()]
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"x").expect("write");
        path
    }

    #[test]
    fn lists_matching_files_sorted() {
        let dir = tempdir().expect("temp dir");
        touch(dir.path(), "c.png");
        touch(dir.path(), "a.JPG");
        touch(dir.path(), "b.jpeg");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "noext");
        std::fs::create_dir(dir.path().join("sub.png")).expect("mkdir");

        let lib = FolderLibrary::new(dir.path(), &exts());
        let names: Vec<String> = lib
            .list()
            .expect("list")
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.JPG", "b.jpeg", "c.png"]);
    }

    #[test]
    fn extensions_accept_leading_dot_and_case() {
        let dir = tempdir().expect("temp dir");
        touch(dir.path(), "x.PNG");
        let lib = FolderLibrary::new(dir.path(), &[".Png".to_string()]);
        assert_eq!(lib.list().expect("list").len(), 1);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let lib = FolderLibrary::new(dir.path().join("gone"), &exts());
        assert!(matches!(lib.list(), Err(LibraryError::Io { .. })));
    }

    #[test]
    fn remove_deletes_file() {
        let dir = tempdir().expect("temp dir");
        let a = touch(dir.path(), "a.png");
        touch(dir.path(), "b.png");
        let mut lib = FolderLibrary::new(dir.path(), &exts());

        lib.remove(&a).expect("remove");

        assert!(!a.exists());
        assert_eq!(lib.list().expect("list").len(), 1);
    }

    #[test]
    fn removing_missing_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let mut lib = FolderLibrary::new(dir.path(), &exts());
        assert!(lib.remove(&dir.path().join("ghost.png")).is_err());
    }
}
