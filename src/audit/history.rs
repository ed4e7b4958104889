use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::audit::log::FIELD_SEPARATOR;
use crate::error::AppError;
use crate::models::{HistoryRecord, RecordFormat};

const LEGACY_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
  Record(HistoryRecord),
  Skipped { line_no: usize, reason: String },
}

/// Tries the current `;;;` layout first, then the legacy ` | ` layout.
pub fn parse_line(line_no: usize, line: &str) -> ParsedLine {
  let line = line.trim_end_matches(['\r', '\n']);
  if line.trim().is_empty() {
    return ParsedLine::Skipped {
      line_no,
      reason: "linha vazia".to_string(),
    };
  }

  let current = split_fields(line, FIELD_SEPARATOR, RecordFormat::Current);
  let attempt = match current {
    Ok(record) => Ok(record),
    Err(current_reason) => split_fields(line, LEGACY_SEPARATOR, RecordFormat::Legacy)
      .map_err(|legacy_reason| format!("{current_reason}; {legacy_reason}")),
  };

  match attempt {
    Ok(record) => ParsedLine::Record(record),
    Err(reason) => ParsedLine::Skipped { line_no, reason },
  }
}

fn split_fields(line: &str, separator: &str, format: RecordFormat) -> Result<HistoryRecord, String> {
  let parts: Vec<&str> = line.splitn(5, separator).collect();
  if parts.len() < 4 {
    return Err(format!("{format:?}: {} campos", parts.len()));
  }
  let quantity = parts[3]
    .trim()
    .parse::<u64>()
    .map_err(|_| format!("{format:?}: quantidade '{}' invalida", parts[3].trim()))?;
  Ok(HistoryRecord {
    format,
    timestamp: parts[0].trim().to_string(),
    operation: parts[1].trim().to_string(),
    item_name: parts[2].trim().to_string(),
    quantity,
    detail: parts.get(4).map(|detail| detail.trim().to_string()).unwrap_or_default(),
  })
}

pub fn parse_history(content: &str) -> Vec<ParsedLine> {
  content
    .lines()
    .enumerate()
    .map(|(index, line)| parse_line(index + 1, line))
    .collect()
}

/// Reads every well-formed record of the file; unreadable lines are logged and skipped.
pub fn read_history(path: &Path) -> Result<Vec<HistoryRecord>, AppError> {
  if !path.exists() {
    return Err(AppError::HistoryMissing(path.to_path_buf()));
  }
  let reader = BufReader::new(File::open(path)?);
  let mut records = Vec::new();
  for (index, line) in reader.split(b'\n').enumerate() {
    let bytes = line?;
    match parse_line(index + 1, &String::from_utf8_lossy(&bytes)) {
      ParsedLine::Record(record) => records.push(record),
      ParsedLine::Skipped { line_no, reason } => {
        warn!(path = %path.display(), line_no, %reason, "linha de historico ignorada");
      }
    }
  }
  Ok(records)
}
