use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::AppError;
use crate::models::HistoryEntry;

pub const FIELD_SEPARATOR: &str = ";;;";
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// `estoque.xlsx` -> `estoque_historico.txt` in the same directory.
pub fn history_path_for(spreadsheet: &Path) -> PathBuf {
  let stem = spreadsheet
    .file_stem()
    .map(|stem| stem.to_string_lossy().to_string())
    .unwrap_or_default();
  spreadsheet.with_file_name(format!("{stem}_historico.txt"))
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
  timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// A field as it is written to the history: line breaks become spaces and `;`
/// becomes `,`, so no field can split the line or touch the separator.
pub fn clean_field(raw: &str) -> String {
  raw
    .chars()
    .map(|c| match c {
      '\r' | '\n' => ' ',
      ';' => ',',
      other => other,
    })
    .collect()
}

pub fn format_entry(entry: &HistoryEntry) -> String {
  [
    format_timestamp(&entry.timestamp),
    entry.operation.as_str().to_string(),
    clean_field(&entry.item_name),
    entry.quantity.to_string(),
    clean_field(&entry.detail),
  ]
  .join(FIELD_SEPARATOR)
}

/// Appends one line per entry, creating the file when absent.
pub fn append_history(path: &Path, entries: &[HistoryEntry]) -> Result<usize, AppError> {
  if entries.is_empty() {
    return Ok(0);
  }
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .map_err(|err| AppError::from_write(err, path))?;
  let mut writer = BufWriter::new(file);
  for entry in entries {
    writeln!(writer, "{}", format_entry(entry)).map_err(|err| AppError::from_write(err, path))?;
  }
  writer.flush().map_err(|err| AppError::from_write(err, path))?;
  Ok(entries.len())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Operation;
  use chrono::NaiveDate;

  fn entry() -> HistoryEntry {
    HistoryEntry {
      timestamp: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(14, 7, 9).unwrap(),
      operation: Operation::Transf,
      item_name: "WIDGET".to_string(),
      quantity: 3,
      detail: "A→B".to_string(),
    }
  }

  #[test]
  fn renders_current_format() {
    assert_eq!(format_entry(&entry()), "05/03/2024 14:07:09;;;TRANSF;;;WIDGET;;;3;;;A→B");
  }

  #[test]
  fn names_cannot_break_the_record() {
    let mut entry = entry();
    entry.item_name = "CABO;;;AZUL\nFINO;".to_string();
    let line = format_entry(&entry);
    assert_eq!(line, "05/03/2024 14:07:09;;;TRANSF;;;CABO,,,AZUL FINO,;;;3;;;A→B");
    assert_eq!(line.matches(FIELD_SEPARATOR).count(), 4);
  }

  #[test]
  fn history_sits_next_to_spreadsheet() {
    assert_eq!(
      history_path_for(Path::new("/dados/estoque.xlsx")),
      PathBuf::from("/dados/estoque_historico.txt")
    );
  }

  #[test]
  fn append_creates_and_extends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("estoque_historico.txt");
    assert_eq!(append_history(&path, &[entry()]).unwrap(), 1);
    assert_eq!(append_history(&path, &[entry(), entry()]).unwrap(), 2);
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.ends_with('\n'));
  }
}
