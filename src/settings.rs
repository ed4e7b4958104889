use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;
use crate::models::Settings;

const SETTINGS_FILE: &str = "settings.json";
const APP_DIR_NAME: &str = "EstoqueLedger";
const IMAGE_DIR: &str = "imagens";

pub fn resolve_app_dir() -> Result<PathBuf, AppError> {
  if let Ok(explicit) = std::env::var("ESTOQUE_APP_DIR") {
    if !explicit.trim().is_empty() {
      let dir = PathBuf::from(explicit);
      fs::create_dir_all(&dir)?;
      return Ok(dir);
    }
  }

  if let Some(portable) = resolve_portable_dir()? {
    return Ok(portable);
  }

  let base = dirs_next::data_local_dir()
    .ok_or_else(|| AppError::Settings("Pasta de dados do usuario nao encontrada".to_string()))?;
  let dir = base.join(APP_DIR_NAME);
  fs::create_dir_all(&dir)?;
  Ok(dir)
}

fn resolve_portable_dir() -> Result<Option<PathBuf>, AppError> {
  let env_enabled = std::env::var("ESTOQUE_PORTABLE")
    .ok()
    .map(|value| {
      let value = value.to_ascii_lowercase();
      value == "1" || value == "true" || value == "yes"
    })
    .unwrap_or(false);

  let exe_dir = std::env::current_exe()
    .ok()
    .and_then(|path| path.parent().map(|parent| parent.to_path_buf()));

  if let Some(exe_dir) = exe_dir {
    let flag = exe_dir.join("portable.flag");
    let data_dir = exe_dir.join("data");
    if env_enabled || flag.exists() || data_dir.exists() {
      fs::create_dir_all(&data_dir)?;
      return Ok(Some(data_dir));
    }
  }

  Ok(None)
}

/// Missing file or missing fields fall back to defaults; the image folder
/// defaults to `<app_dir>/imagens`.
pub fn load_settings(app_dir: &Path) -> Result<Settings, AppError> {
  let path = app_dir.join(SETTINGS_FILE);
  let mut settings = if path.exists() {
    let raw = fs::read_to_string(&path)?;
    serde_json::from_str::<Settings>(&raw)
      .map_err(|err| AppError::Settings(format!("{}: {err}", path.display())))?
  } else {
    Settings::default()
  };

  if settings.image_folder.trim().is_empty() {
    settings.image_folder = app_dir.join(IMAGE_DIR).to_string_lossy().to_string();
  }
  debug!(path = %path.display(), "configuracao carregada");
  Ok(settings)
}

pub fn save_settings(app_dir: &Path, settings: &Settings) -> Result<(), AppError> {
  fs::create_dir_all(app_dir)?;
  let path = app_dir.join(SETTINGS_FILE);
  let raw = serde_json::to_string_pretty(settings)?;
  fs::write(&path, raw).map_err(|err| AppError::from_write(err, &path))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let settings = load_settings(dir.path()).unwrap();
    assert_eq!(settings.location_a_label, "Canoas");
    assert_eq!(settings.location_b_label, "Passo Fundo");
    assert_eq!(settings.log_level, "warn");
    assert_eq!(PathBuf::from(&settings.image_folder), dir.path().join("imagens"));
  }

  #[test]
  fn partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SETTINGS_FILE), r#"{ "last_file": "/dados/estoque.xlsx" }"#).unwrap();
    let settings = load_settings(dir.path()).unwrap();
    assert_eq!(settings.last_file.as_deref(), Some("/dados/estoque.xlsx"));
    assert_eq!(settings.log_level, "warn");
  }

  #[test]
  fn round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = load_settings(dir.path()).unwrap();
    settings.location_b_label = "PF".to_string();
    save_settings(dir.path(), &settings).unwrap();
    assert_eq!(load_settings(dir.path()).unwrap(), settings);
  }

  #[test]
  fn broken_file_is_a_settings_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SETTINGS_FILE), "{ nope").unwrap();
    assert_eq!(load_settings(dir.path()).unwrap_err().code(), "SETTINGS_ERROR");
  }
}
