use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::AppError;
use crate::models::ReportTable;

pub fn export_report_csv(report: &ReportTable, path: &Path) -> Result<(), AppError> {
  let file = File::create(path).map_err(|err| AppError::from_write(err, path))?;
  let mut file = BufWriter::new(file);
  writeln!(file, "{}", join_row(&report.header))?;
  for row in &report.rows {
    writeln!(file, "{}", join_row(row))?;
  }
  file.flush()?;
  Ok(())
}

fn join_row(values: &[String]) -> String {
  values.iter().map(|value| escape_csv(value)).collect::<Vec<_>>().join(",")
}

fn escape_csv(value: &str) -> String {
  if value.contains(',') || value.contains('"') || value.contains('\n') {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}
