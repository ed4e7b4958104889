use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::audit::history::read_history;
use crate::audit::log::clean_field;
use crate::domain::abc;
use crate::error::AppError;
use crate::models::{AbcRow, HistoryRecord, ItemRow, ReportTable, StockFilter, StockReportRow, StockViewRow};

/// Full rescan of the history file on every call.
pub fn classify_abc(rows: &[ItemRow], history_path: &Path) -> Result<Vec<AbcRow>, AppError> {
  let records = read_history(history_path)?;
  debug!(path = %history_path.display(), records = records.len(), "historico lido");
  Ok(classify_records(rows, &records))
}

/// Every table item is ranked, including those that never left stock.
/// Ties keep table order.
pub fn classify_records(rows: &[ItemRow], records: &[HistoryRecord]) -> Vec<AbcRow> {
  let mut exits: HashMap<&str, u64> = HashMap::new();
  for record in records.iter().filter(|record| abc::is_exit_operation(&record.operation)) {
    let total = exits.entry(record.item_name.as_str()).or_insert(0);
    *total = total.saturating_add(record.quantity);
  }

  let mut ranking = rows
    .iter()
    .map(|row| {
      let key = clean_field(row.name.trim());
      let total = exits.get(key.as_str()).copied().unwrap_or(0);
      AbcRow {
        name: row.name.clone(),
        exits: total,
        class: abc::classify(total),
      }
    })
    .collect::<Vec<_>>();
  ranking.sort_by(|a, b| b.exits.cmp(&a.exits));
  ranking
}

/// Rows holding stock somewhere. `display_id` follows spreadsheet numbering
/// (header is row 1).
pub fn current_stock_report(rows: &[ItemRow]) -> Vec<StockReportRow> {
  rows
    .iter()
    .enumerate()
    .filter(|(_, row)| row.in_stock())
    .map(|(position, row)| StockReportRow {
      display_id: position + 2,
      name: row.name.clone(),
      balance_a: row.balance_a,
      balance_b: row.balance_b,
    })
    .collect()
}

pub fn stock_view(rows: &[ItemRow], filter: StockFilter, search: Option<&str>) -> Vec<StockViewRow> {
  let term = search.map(str::trim).filter(|term| !term.is_empty()).map(str::to_lowercase);
  rows
    .iter()
    .enumerate()
    .filter(|(_, row)| term.as_ref().map_or(true, |term| row.name.to_lowercase().contains(term)))
    .filter(|(_, row)| match filter {
      StockFilter::All => true,
      StockFilter::PositiveA => row.balance_a > 0,
      StockFilter::ZeroA => row.balance_a == 0,
      StockFilter::PositiveB => row.balance_b > 0,
      StockFilter::ZeroB => row.balance_b == 0,
    })
    .map(|(position, row)| StockViewRow {
      position,
      display_id: display_id(position, row),
      name: row.name.clone(),
      balance_a: row.balance_a,
      balance_b: row.balance_b,
      in_stock: row.in_stock(),
    })
    .collect()
}

fn display_id(position: usize, row: &ItemRow) -> String {
  if let Some(id) = row.id.as_i64() {
    return id.to_string();
  }
  let raw = row.id.to_string();
  if raw.trim().is_empty() {
    (position + 2).to_string()
  } else {
    raw.trim().to_string()
  }
}

pub fn abc_table(ranking: &[AbcRow]) -> ReportTable {
  ReportTable {
    title: "Relatorio ABC".to_string(),
    header: vec!["Produto".to_string(), "Saidas".to_string(), "Classificacao".to_string()],
    rows: ranking
      .iter()
      .map(|row| vec![row.name.clone(), row.exits.to_string(), row.class.label().to_string()])
      .collect(),
  }
}

pub fn stock_table(report: &[StockReportRow], label_a: &str, label_b: &str) -> ReportTable {
  ReportTable {
    title: "Estoque Atual".to_string(),
    header: vec!["ID".to_string(), "Produto".to_string(), label_a.to_string(), label_b.to_string()],
    rows: report
      .iter()
      .map(|row| {
        vec![
          row.display_id.to_string(),
          row.name.clone(),
          row.balance_a.to_string(),
          row.balance_b.to_string(),
        ]
      })
      .collect(),
  }
}
