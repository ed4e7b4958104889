use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use walkdir::WalkDir;

use crate::error::AppError;
use crate::models::BackupInfo;

pub const BACKUP_DIR: &str = "backups";
const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";
const STAMP_LEN: usize = 16;

pub fn backup_dir_for(source: &Path) -> PathBuf {
  source.parent().unwrap_or_else(|| Path::new(".")).join(BACKUP_DIR)
}

/// `estoque.xlsx` at 2024-03-05 14:07 -> `estoque_2024-03-05_14-07.xlsx`.
pub fn backup_file_name(source: &Path, stamp: &NaiveDateTime) -> String {
  let stem = source
    .file_stem()
    .map(|stem| stem.to_string_lossy().to_string())
    .unwrap_or_else(|| "planilha".to_string());
  let stamp = stamp.format(STAMP_FORMAT);
  match source.extension() {
    Some(ext) => format!("{stem}_{stamp}.{}", ext.to_string_lossy()),
    None => format!("{stem}_{stamp}"),
  }
}

/// Copies the on-disk file into the sibling `backups` directory. Two saves in the
/// same minute overwrite the same artifact.
pub fn create_backup(source: &Path, stamp: &NaiveDateTime) -> Result<PathBuf, AppError> {
  let backup_dir = backup_dir_for(source);
  fs::create_dir_all(&backup_dir)?;
  let target = backup_dir.join(backup_file_name(source, stamp));
  fs::copy(source, &target)?;
  Ok(target)
}

/// `name` must be exactly `<stem>_<%Y-%m-%d_%H-%M>[.<ext>]`, so `estoque_demo_...`
/// is not taken for a backup of `estoque.xlsx`.
fn is_backup_of(source: &Path, name: &str) -> bool {
  let stem = source.file_stem().map(|stem| stem.to_string_lossy().to_string()).unwrap_or_default();
  let suffix = source
    .extension()
    .map(|ext| format!(".{}", ext.to_string_lossy()))
    .unwrap_or_default();
  let Some(stamp) = name
    .strip_prefix(stem.as_str())
    .and_then(|rest| rest.strip_prefix('_'))
    .and_then(|rest| rest.strip_suffix(suffix.as_str()))
  else {
    return false;
  };
  stamp.len() == STAMP_LEN && NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).is_ok()
}

/// Backups of `source`, newest first.
pub fn list_backups(source: &Path) -> Result<Vec<BackupInfo>, AppError> {
  let backup_dir = backup_dir_for(source);
  if !backup_dir.exists() {
    return Ok(Vec::new());
  }
  let mut found = Vec::new();
  for entry in WalkDir::new(&backup_dir).max_depth(1).into_iter().filter_map(Result::ok) {
    if !entry.file_type().is_file() {
      continue;
    }
    let name = entry.file_name().to_string_lossy().to_string();
    if !is_backup_of(source, &name) {
      continue;
    }
    let metadata = entry.metadata().map_err(|err| AppError::Io(err.into()))?;
    let modified = metadata.modified().ok().map(DateTime::<Local>::from);
    found.push((modified, BackupInfo {
      name,
      path: entry.path().to_string_lossy().to_string(),
      size: metadata.len(),
      modified: modified.map(|at| at.format("%d/%m/%Y %H:%M:%S").to_string()),
    }));
  }

  found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.name.cmp(&a.1.name)));
  Ok(found.into_iter().map(|(_, info)| info).collect())
}
