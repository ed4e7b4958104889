#![allow(dead_code)]

use std::path::{Path, PathBuf};

use estoque_ledger::models::{CellValue, ItemRow, StockTable};
use rust_xlsxwriter::Workbook;

pub enum Fx<'a> {
  S(&'a str),
  N(f64),
  B(bool),
  E,
}

/// Writes a workbook the way a user would have it: header row, then data.
pub fn write_fixture(path: &Path, sheet: &str, rows: &[Vec<Fx<'_>>]) {
  let mut workbook = Workbook::new();
  let worksheet = workbook.add_worksheet();
  worksheet.set_name(sheet).unwrap();
  for (r, row) in rows.iter().enumerate() {
    for (c, cell) in row.iter().enumerate() {
      let (r, c) = (r as u32, c as u16);
      match cell {
        Fx::S(text) => {
          worksheet.write_string(r, c, *text).unwrap();
        }
        Fx::N(value) => {
          worksheet.write_number(r, c, *value).unwrap();
        }
        Fx::B(value) => {
          worksheet.write_boolean(r, c, *value).unwrap();
        }
        Fx::E => {}
      }
    }
  }
  workbook.save(path).unwrap();
}

pub fn standard_fixture(dir: &Path) -> PathBuf {
  let path = dir.join("estoque.xlsx");
  write_fixture(
    &path,
    "Estoque",
    &[
      vec![Fx::S("ID"), Fx::S("PRODUTO"), Fx::S("CANOAS"), Fx::S("PF"), Fx::S("FORNECEDOR"), Fx::S("ATIVO")],
      vec![Fx::N(1.0), Fx::S("PARAFUSO M8"), Fx::N(10.0), Fx::N(4.0), Fx::S("Ferragens Sul"), Fx::B(true)],
      vec![Fx::N(2.0), Fx::S("PORCA M8"), Fx::S("n/d"), Fx::N(3.0), Fx::E, Fx::B(false)],
      vec![Fx::N(5.0), Fx::S("ARRUELA"), Fx::N(0.0), Fx::N(0.0), Fx::N(12.5), Fx::E],
    ],
  );
  path
}

pub fn table_with(rows: Vec<(&str, u64, u64)>) -> StockTable {
  StockTable {
    sheet_name: "Plan1".to_string(),
    header: vec!["ID".into(), "PRODUTO".into(), "CANOAS".into(), "PF".into()],
    rows: rows
      .into_iter()
      .enumerate()
      .map(|(index, (name, a, b))| ItemRow {
        id: CellValue::Number((index + 1) as f64),
        name: name.to_string(),
        balance_a: a,
        balance_b: b,
        extra: Vec::new(),
      })
      .collect(),
  }
}
