use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::error::AppError;
use crate::models::{CellValue, ItemRow, StockTable};

const COL_ID: usize = 0;
const COL_NAME: usize = 1;
const COL_BALANCE_A: usize = 2;
const COL_BALANCE_B: usize = 3;
const FIXED_COLUMNS: usize = 4;

const DATE_FORMAT: &str = "dd/mm/yyyy hh:mm";

/// Reads the first sheet of `path`. The first row is the header.
pub fn read_table(path: &Path) -> Result<StockTable, AppError> {
  let mut workbook =
    open_workbook_auto(path).map_err(|err| AppError::Load(format!("{}: {err}", path.display())))?;
  let sheet_name = workbook
    .sheet_names()
    .first()
    .cloned()
    .ok_or_else(|| AppError::Load("Planilha sem abas".to_string()))?;
  let range = workbook.worksheet_range(&sheet_name)?;

  let rows = range
    .rows()
    .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>())
    .collect::<Vec<_>>();
  let table = table_from_rows(sheet_name, rows)?;
  debug!(path = %path.display(), rows = table.rows.len(), columns = table.width(), "planilha carregada");
  Ok(table)
}

pub fn table_from_rows(sheet_name: String, rows: Vec<Vec<CellValue>>) -> Result<StockTable, AppError> {
  let mut rows = rows.into_iter();
  let header_cells = rows
    .next()
    .ok_or_else(|| AppError::Load("Planilha vazia, cabecalho ausente".to_string()))?;
  let body = rows.filter(|cells| !cells.iter().all(CellValue::is_empty)).collect::<Vec<_>>();

  let width = body.iter().map(Vec::len).chain(std::iter::once(header_cells.len())).max().unwrap_or(0);
  if width < FIXED_COLUMNS {
    return Err(AppError::Load(format!(
      "Esperadas ao menos {FIXED_COLUMNS} colunas (id, nome, saldo A, saldo B), encontradas {width}"
    )));
  }

  let mut header = header_cells.iter().map(ToString::to_string).collect::<Vec<_>>();
  header.resize(width, String::new());

  let rows = body.into_iter().map(|cells| row_from_cells(cells, width)).collect();
  Ok(StockTable {
    sheet_name,
    header,
    rows,
  })
}

fn row_from_cells(mut cells: Vec<CellValue>, width: usize) -> ItemRow {
  cells.resize(width, CellValue::Empty);
  let extra = cells.split_off(FIXED_COLUMNS);
  ItemRow {
    id: cells[COL_ID].clone(),
    name: cells[COL_NAME].to_string(),
    balance_a: coerce_balance(&cells[COL_BALANCE_A]),
    balance_b: coerce_balance(&cells[COL_BALANCE_B]),
    extra,
  }
}

/// Non-numeric and negative balances load as zero.
fn coerce_balance(cell: &CellValue) -> u64 {
  cell.as_i64().map(|value| value.max(0) as u64).unwrap_or(0)
}

fn cell_from_data(data: &Data) -> CellValue {
  match data {
    Data::Empty => CellValue::Empty,
    Data::String(text) if text.is_empty() => CellValue::Empty,
    Data::String(text) => CellValue::Text(text.clone()),
    Data::Float(value) => CellValue::Number(*value),
    Data::Int(value) => CellValue::Number(*value as f64),
    Data::Bool(value) => CellValue::Bool(*value),
    Data::DateTime(value) => CellValue::DateTime(value.as_f64()),
    Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::Text(text.clone()),
    Data::Error(err) => CellValue::Text(err.to_string()),
  }
}

/// Writes the whole table as a single-sheet xlsx, replacing `path`.
pub fn write_table(path: &Path, table: &StockTable) -> Result<(), AppError> {
  let extension = path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(str::to_ascii_lowercase)
    .unwrap_or_default();
  if extension != "xlsx" {
    return Err(AppError::Export(format!(
      "Somente arquivos .xlsx podem ser salvos ({})",
      path.display()
    )));
  }

  let buffer = render_table(table)?;
  fs::write(path, buffer).map_err(|err| AppError::from_write(err, path))?;
  debug!(path = %path.display(), rows = table.rows.len(), "planilha gravada");
  Ok(())
}

pub fn render_table(table: &StockTable) -> Result<Vec<u8>, AppError> {
  let mut workbook = Workbook::new();
  let date_format = Format::new().set_num_format(DATE_FORMAT);
  {
    let sheet = workbook.add_worksheet();
    if !table.sheet_name.is_empty() {
      sheet.set_name(&table.sheet_name)?;
    }

    for (col, title) in table.header.iter().enumerate() {
      if !title.is_empty() {
        sheet.write_string(0, col as u16, title)?;
      }
    }

    for (index, item) in table.rows.iter().enumerate() {
      let row = (index + 1) as u32;
      write_cell(sheet, row, COL_ID as u16, &item.id, &date_format)?;
      if !item.name.is_empty() {
        sheet.write_string(row, COL_NAME as u16, &item.name)?;
      }
      sheet.write_number(row, COL_BALANCE_A as u16, item.balance_a as f64)?;
      sheet.write_number(row, COL_BALANCE_B as u16, item.balance_b as f64)?;
      for (offset, cell) in item.extra.iter().enumerate() {
        write_cell(sheet, row, (FIXED_COLUMNS + offset) as u16, cell, &date_format)?;
      }
    }
  }
  Ok(workbook.save_to_buffer()?)
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue, date_format: &Format) -> Result<(), AppError> {
  match cell {
    CellValue::Empty => {}
    CellValue::Text(text) => {
      sheet.write_string(row, col, text)?;
    }
    CellValue::Number(value) => {
      sheet.write_number(row, col, *value)?;
    }
    CellValue::Bool(value) => {
      sheet.write_boolean(row, col, *value)?;
    }
    CellValue::DateTime(value) => {
      sheet.write_number_with_format(row, col, *value, date_format)?;
    }
  }
  Ok(())
}
