use std::fs;
use std::path::Path;

use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use crate::error::AppError;
use crate::models::ReportTable;

const HEADER_ROW: u32 = 3;

/// Title on row 1, generation time on row 2, header on row 4, data below.
pub fn export_report_xlsx(report: &ReportTable, path: &Path) -> Result<(), AppError> {
  let mut workbook = Workbook::new();
  let title_format = Format::new().set_bold().set_font_size(14);
  let header_format = Format::new()
    .set_bold()
    .set_font_color(Color::White)
    .set_background_color(Color::RGB(0x00_00_8B))
    .set_align(FormatAlign::Center);
  let cell_format = Format::new().set_align(FormatAlign::Center);

  {
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name(&report.title))?;
    sheet.write_string_with_format(0, 0, &report.title, &title_format)?;
    sheet.write_string(1, 0, format!("Gerado em: {}", Local::now().format("%d/%m/%Y %H:%M")))?;

    for (col, title) in report.header.iter().enumerate() {
      let col = col as u16;
      sheet.write_string_with_format(HEADER_ROW, col, title, &header_format)?;
      let widest = report
        .rows
        .iter()
        .filter_map(|row| row.get(col as usize))
        .map(|value| value.chars().count())
        .chain(std::iter::once(title.chars().count()))
        .max()
        .unwrap_or(8);
      sheet.set_column_width(col, (widest + 2).min(60) as f64)?;
    }

    let mut row = HEADER_ROW + 1;
    for values in &report.rows {
      for (col, value) in values.iter().enumerate() {
        match value.parse::<f64>() {
          Ok(number) => sheet.write_number_with_format(row, col as u16, number, &cell_format)?,
          Err(_) => sheet.write_string_with_format(row, col as u16, value, &cell_format)?,
        };
      }
      row += 1;
    }

    if row > HEADER_ROW + 1 && !report.header.is_empty() {
      sheet.autofilter(HEADER_ROW, 0, row - 1, (report.header.len() - 1) as u16)?;
    }
    sheet.set_freeze_panes(HEADER_ROW + 1, 0)?;
  }

  let buffer = workbook.save_to_buffer()?;
  fs::write(path, buffer).map_err(|err| AppError::from_write(err, path))?;
  Ok(())
}

fn sheet_name(title: &str) -> String {
  let cleaned: String = title
    .chars()
    .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
    .take(31)
    .collect();
  if cleaned.trim().is_empty() {
    "Relatorio".to_string()
  } else {
    cleaned
  }
}
