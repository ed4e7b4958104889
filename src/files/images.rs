use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::AppError;

pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];
const INVALID_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Product photos kept under a folder, keyed by sanitised item name.
pub struct ImageStore {
  folder: PathBuf,
}

impl ImageStore {
  pub fn open(folder: impl Into<PathBuf>) -> Result<Self, AppError> {
    let folder = folder.into();
    fs::create_dir_all(&folder)?;
    Ok(Self { folder })
  }

  pub fn folder(&self) -> &Path {
    &self.folder
  }

  pub fn find(&self, item_name: &str) -> Option<PathBuf> {
    let safe_name = clean_filename(item_name);
    if safe_name.is_empty() {
      return None;
    }
    IMAGE_EXTENSIONS
      .iter()
      .map(|ext| self.folder.join(format!("{safe_name}.{ext}")))
      .find(|path| path.exists())
  }

  /// Replaces any existing photo of the item with a copy of `source`.
  pub fn save(&self, source: &Path, item_name: &str) -> Result<PathBuf, AppError> {
    let safe_name = clean_filename(item_name);
    if safe_name.is_empty() {
      return Err(AppError::ItemNotFound(item_name.to_string()));
    }
    if !source.exists() {
      return Err(AppError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("Imagem nao encontrada: {}", source.display()),
      )));
    }

    self.delete(item_name);
    let extension = source
      .extension()
      .map(|ext| ext.to_string_lossy().to_lowercase())
      .unwrap_or_else(|| "jpg".to_string());
    let destination = self.folder.join(format!("{safe_name}.{extension}"));
    fs::copy(source, &destination)?;
    Ok(destination)
  }

  /// Removes every known variant; true when at least one file was removed.
  pub fn delete(&self, item_name: &str) -> bool {
    let safe_name = clean_filename(item_name);
    if safe_name.is_empty() {
      return false;
    }
    let mut removed = false;
    for ext in IMAGE_EXTENSIONS {
      let path = self.folder.join(format!("{safe_name}.{ext}"));
      if !path.exists() {
        continue;
      }
      match fs::remove_file(&path) {
        Ok(()) => removed = true,
        Err(err) => warn!(path = %path.display(), error = %err, "falha ao remover imagem"),
      }
    }
    removed
  }
}

pub fn clean_filename(name: &str) -> String {
  name.chars().filter(|c| !INVALID_CHARS.contains(c)).collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_characters_windows_rejects() {
    assert_eq!(clean_filename(r#" CABO 1/2" <AZUL>? "#), "CABO 12 AZUL");
    assert_eq!(clean_filename("a:b|c*d\\e"), "abcde");
  }

  #[test]
  fn save_replaces_previous_variant() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::open(dir.path().join("imagens")).unwrap();
    let png = dir.path().join("foto.PNG");
    let jpg = dir.path().join("foto.jpg");
    fs::write(&png, b"png").unwrap();
    fs::write(&jpg, b"jpg").unwrap();

    let first = store.save(&png, "PORCA M8").unwrap();
    assert_eq!(first.file_name().unwrap(), "PORCA M8.png");
    let second = store.save(&jpg, "PORCA M8").unwrap();
    assert!(!first.exists());
    assert_eq!(store.find("PORCA M8"), Some(second));
  }

  #[test]
  fn delete_reports_whether_anything_went() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImageStore::open(dir.path()).unwrap();
    fs::write(dir.path().join("X.jpeg"), b"x").unwrap();
    assert!(store.delete("X"));
    assert!(!store.delete("X"));
    assert_eq!(store.find("X"), None);
  }
}
