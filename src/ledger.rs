use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::audit::log::history_path_for;
use crate::domain::validation;
use crate::error::AppError;
use crate::models::{CellValue, HistoryEntry, ItemRow, Movement, Operation, StockTable, Totals};
use crate::workbook;

/// The stock table of one spreadsheet plus the history lines not yet saved.
///
/// Every mutation checks its preconditions before touching a row, so a failed
/// call leaves both the table and the history buffer as they were.
#[derive(Debug, Clone)]
pub struct Ledger {
  path: PathBuf,
  history_path: PathBuf,
  table: StockTable,
  history: Vec<HistoryEntry>,
}

impl Ledger {
  pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
    let path = path.as_ref();
    let table = workbook::read_table(path)?;
    Ok(Self::from_table(path, table))
  }

  pub fn from_table(path: impl Into<PathBuf>, table: StockTable) -> Self {
    let path = path.into();
    Self {
      history_path: history_path_for(&path),
      path,
      table,
      history: Vec::new(),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn history_path(&self) -> &Path {
    &self.history_path
  }

  pub fn table(&self) -> &StockTable {
    &self.table
  }

  pub fn rows(&self) -> &[ItemRow] {
    &self.table.rows
  }

  pub fn len(&self) -> usize {
    self.table.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.rows.is_empty()
  }

  pub fn row(&self, index: usize) -> Result<&ItemRow, AppError> {
    self.table.rows.get(index).ok_or(AppError::Index {
      index,
      len: self.table.rows.len(),
    })
  }

  /// Position of the first row with this name, ignoring case.
  pub fn find_by_name(&self, name: &str) -> Option<usize> {
    let wanted = validation::normalize_name(name);
    self
      .table
      .rows
      .iter()
      .position(|row| validation::normalize_name(&row.name) == wanted)
  }

  pub fn pending_history(&self) -> &[HistoryEntry] {
    &self.history
  }

  pub(crate) fn clear_history(&mut self) {
    self.history.clear();
  }

  pub fn totals(&self) -> Totals {
    self.table.rows.iter().fold(Totals { a: 0, b: 0 }, |acc, row| Totals {
      a: acc.a.saturating_add(row.balance_a),
      b: acc.b.saturating_add(row.balance_b),
    })
  }

  /// `max(numeric ids) + 1`, or `row count + 1` when no id is numeric.
  pub fn next_id(&self) -> i64 {
    self
      .table
      .rows
      .iter()
      .filter_map(|row| row.id.as_i64())
      .max()
      .map(|max| max + 1)
      .unwrap_or(self.table.rows.len() as i64 + 1)
  }

  pub fn add_item(&mut self, name: &str, qty_a: u64, qty_b: u64) -> String {
    let id = self.next_id();
    let name = validation::normalize_name(name);
    let extra = vec![CellValue::Empty; self.table.width() - 4];
    self.table.rows.push(ItemRow {
      id: CellValue::Number(id as f64),
      name: name.clone(),
      balance_a: qty_a,
      balance_b: qty_b,
      extra,
    });
    debug!(id, item = %name, qty_a, qty_b, "item cadastrado");
    self.record(Operation::Cadastro, &name, 0, format!("A={qty_a}/B={qty_b}"));
    name
  }

  pub fn remove_item(&mut self, index: usize) -> Result<String, AppError> {
    let name = self.row(index)?.name.clone();
    self.record(Operation::Exclusao, &name, 0, "Item removido".to_string());
    self.table.rows.remove(index);
    debug!(index, item = %name, "item removido");
    Ok(name)
  }

  pub fn move_stock(&mut self, index: usize, movement: Movement, quantity: u64) -> Result<String, AppError> {
    validation::ensure_quantity_positive(quantity)?;
    let len = self.table.rows.len();
    let row = self.table.rows.get_mut(index).ok_or(AppError::Index { index, len })?;

    match movement {
      Movement::Entry(location) => {
        let balance = row.balance_mut(location);
        *balance = balance.checked_add(quantity).ok_or(AppError::InvalidQuantity(quantity))?;
      }
      Movement::Exit(location) => {
        let balance = row.balance_mut(location);
        if *balance < quantity {
          return Err(AppError::InsufficientBalance { available: *balance });
        }
        *balance -= quantity;
      }
      Movement::Transfer(direction) => {
        let available = row.balance(direction.source());
        if available < quantity {
          return Err(AppError::InsufficientBalance { available });
        }
        let target = row
          .balance(direction.target())
          .checked_add(quantity)
          .ok_or(AppError::InvalidQuantity(quantity))?;
        *row.balance_mut(direction.source()) = available - quantity;
        *row.balance_mut(direction.target()) = target;
      }
    }

    let name = row.name.clone();
    debug!(index, item = %name, ?movement, quantity, "estoque movimentado");
    self.record(movement.operation(), &name, quantity, movement.detail());
    Ok(name)
  }

  fn record(&mut self, operation: Operation, item_name: &str, quantity: u64, detail: String) {
    self.history.push(HistoryEntry {
      timestamp: Local::now().naive_local(),
      operation,
      item_name: item_name.to_string(),
      quantity,
      detail,
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Location, TransferDirection};

  fn empty() -> Ledger {
    Ledger::from_table(
      "/tmp/estoque.xlsx",
      StockTable {
        sheet_name: "Plan1".to_string(),
        header: vec!["ID".into(), "PRODUTO".into(), "CANOAS".into(), "PF".into(), "OBS".into()],
        rows: Vec::new(),
      },
    )
  }

  #[test]
  fn ids_start_at_one_and_increment() {
    let mut ledger = empty();
    assert_eq!(ledger.add_item("foo", 5, 2), "FOO");
    ledger.add_item("bar", 0, 0);
    assert_eq!(ledger.rows()[0].id, CellValue::Number(1.0));
    assert_eq!(ledger.rows()[1].id, CellValue::Number(2.0));
    assert_eq!(ledger.rows()[0].extra, vec![CellValue::Empty]);
  }

  #[test]
  fn next_id_skips_gaps_and_falls_back_to_row_count() {
    let mut ledger = empty();
    ledger.table.rows.push(ItemRow {
      id: CellValue::Text("sem id".into()),
      name: "A".into(),
      balance_a: 0,
      balance_b: 0,
      extra: vec![CellValue::Empty],
    });
    assert_eq!(ledger.next_id(), 2);
    ledger.table.rows[0].id = CellValue::Number(40.0);
    assert_eq!(ledger.next_id(), 41);
  }

  #[test]
  fn creation_is_logged_with_both_quantities() {
    let mut ledger = empty();
    ledger.add_item("foo", 5, 2);
    let entry = &ledger.pending_history()[0];
    assert_eq!(entry.operation, Operation::Cadastro);
    assert_eq!(entry.quantity, 0);
    assert_eq!(entry.detail, "A=5/B=2");
  }

  #[test]
  fn zero_quantity_leaves_everything_untouched() {
    let mut ledger = empty();
    ledger.add_item("foo", 5, 0);
    let err = ledger.move_stock(0, Movement::Entry(Location::A), 0).unwrap_err();
    assert_eq!(err.code(), "INVALID_QUANTITY");
    assert_eq!(ledger.rows()[0].balance_a, 5);
    assert_eq!(ledger.pending_history().len(), 1);
  }

  #[test]
  fn entry_overflow_is_rejected() {
    let mut ledger = empty();
    ledger.add_item("foo", u64::MAX, 0);
    assert!(ledger.move_stock(0, Movement::Entry(Location::A), 1).is_err());
    assert!(ledger.move_stock(0, Movement::Transfer(TransferDirection::BToA), 1).is_err());
    assert_eq!(ledger.rows()[0].balance_a, u64::MAX);
  }

  #[test]
  fn totals_saturate_instead_of_wrapping() {
    let mut ledger = empty();
    ledger.add_item("foo", u64::MAX, 3);
    ledger.add_item("bar", 1, 4);
    assert_eq!(ledger.totals(), Totals { a: u64::MAX, b: 7 });
  }

  #[test]
  fn find_by_name_ignores_case() {
    let mut ledger = empty();
    ledger.add_item("Porca", 1, 1);
    assert_eq!(ledger.find_by_name("porca"), Some(0));
    assert_eq!(ledger.find_by_name("parafuso"), None);
  }
}
