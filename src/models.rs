use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const LOCATION_A_NAME: &str = "Canoas";
pub const LOCATION_B_NAME: &str = "Passo Fundo";

/// A spreadsheet cell as it was read, kept so unknown columns survive a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
  Empty,
  Text(String),
  Number(f64),
  Bool(bool),
  /// Excel serial date, written back with a date format.
  DateTime(f64),
}

impl CellValue {
  pub fn is_empty(&self) -> bool {
    match self {
      CellValue::Empty => true,
      CellValue::Text(text) => text.trim().is_empty(),
      _ => false,
    }
  }

  /// Integer reading of the cell, used for ids and balances.
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      CellValue::Number(value) if value.is_finite() => Some(value.trunc() as i64),
      CellValue::Text(text) => {
        let trimmed = text.trim();
        trimmed
          .parse::<i64>()
          .ok()
          .or_else(|| trimmed.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
      }
      _ => None,
    }
  }
}

impl fmt::Display for CellValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CellValue::Empty => Ok(()),
      CellValue::Text(text) => write!(f, "{text}"),
      CellValue::Number(value) | CellValue::DateTime(value) => {
        if value.fract() == 0.0 && value.abs() < 1e15 {
          write!(f, "{}", *value as i64)
        } else {
          write!(f, "{value}")
        }
      }
      CellValue::Bool(value) => write!(f, "{value}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
  pub id: CellValue,
  pub name: String,
  pub balance_a: u64,
  pub balance_b: u64,
  /// Columns after the first four, copied as-is.
  pub extra: Vec<CellValue>,
}

impl ItemRow {
  pub fn balance(&self, location: Location) -> u64 {
    match location {
      Location::A => self.balance_a,
      Location::B => self.balance_b,
    }
  }

  pub fn balance_mut(&mut self, location: Location) -> &mut u64 {
    match location {
      Location::A => &mut self.balance_a,
      Location::B => &mut self.balance_b,
    }
  }

  pub fn in_stock(&self) -> bool {
    self.balance_a > 0 || self.balance_b > 0
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockTable {
  pub sheet_name: String,
  pub header: Vec<String>,
  pub rows: Vec<ItemRow>,
}

impl StockTable {
  pub fn width(&self) -> usize {
    self.header.len().max(4)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
  A,
  B,
}

impl Location {
  pub fn name(self) -> &'static str {
    match self {
      Location::A => LOCATION_A_NAME,
      Location::B => LOCATION_B_NAME,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
  AToB,
  BToA,
}

impl TransferDirection {
  pub fn source(self) -> Location {
    match self {
      TransferDirection::AToB => Location::A,
      TransferDirection::BToA => Location::B,
    }
  }

  pub fn target(self) -> Location {
    match self {
      TransferDirection::AToB => Location::B,
      TransferDirection::BToA => Location::A,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      TransferDirection::AToB => "A→B",
      TransferDirection::BToA => "B→A",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
  Entry(Location),
  Exit(Location),
  Transfer(TransferDirection),
}

impl Movement {
  pub fn operation(self) -> Operation {
    match self {
      Movement::Entry(_) => Operation::Entrada,
      Movement::Exit(_) => Operation::Saida,
      Movement::Transfer(_) => Operation::Transf,
    }
  }

  pub fn detail(self) -> String {
    match self {
      Movement::Entry(location) | Movement::Exit(location) => {
        format!("{} em {}", self.operation().as_str(), location.name())
      }
      Movement::Transfer(direction) => direction.label().to_string(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
  Entrada,
  Saida,
  Transf,
  Cadastro,
  Exclusao,
}

impl Operation {
  pub fn as_str(self) -> &'static str {
    match self {
      Operation::Entrada => "ENTRADA",
      Operation::Saida => "SAIDA",
      Operation::Transf => "TRANSF",
      Operation::Cadastro => "CADASTRO",
      Operation::Exclusao => "EXCLUSAO",
    }
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One buffered mutation record, written to the history file on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub timestamp: NaiveDateTime,
  pub operation: Operation,
  pub item_name: String,
  pub quantity: u64,
  pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordFormat {
  Current,
  Legacy,
}

/// A record read back from the history file. Operation is free text because
/// older files carry names this version never writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
  pub format: RecordFormat,
  pub timestamp: String,
  pub operation: String,
  pub item_name: String,
  pub quantity: u64,
  pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
  pub a: u64,
  pub b: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbcClass {
  A,
  B,
  C,
}

impl AbcClass {
  pub fn label(self) -> &'static str {
    match self {
      AbcClass::A => "A (Alto Giro)",
      AbcClass::B => "B (Medio Giro)",
      AbcClass::C => "C (Sem Giro)",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbcRow {
  pub name: String,
  pub exits: u64,
  pub class: AbcClass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReportRow {
  pub display_id: usize,
  pub name: String,
  pub balance_a: u64,
  pub balance_b: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StockFilter {
  #[default]
  All,
  PositiveA,
  ZeroA,
  PositiveB,
  ZeroB,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockViewRow {
  pub position: usize,
  pub display_id: String,
  pub name: String,
  pub balance_a: u64,
  pub balance_b: u64,
  pub in_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReport {
  pub backup_name: String,
  pub backup_created: bool,
  pub history_flushed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
  pub name: String,
  pub path: String,
  pub size: u64,
  pub modified: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
  pub last_file: Option<String>,
  pub location_a_label: String,
  pub location_b_label: String,
  pub image_folder: String,
  pub log_level: String,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      last_file: None,
      location_a_label: LOCATION_A_NAME.to_string(),
      location_b_label: LOCATION_B_NAME.to_string(),
      image_folder: String::new(),
      log_level: "warn".to_string(),
    }
  }
}

/// A rendered report, ready for CSV or xlsx export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTable {
  pub title: String,
  pub header: Vec<String>,
  pub rows: Vec<Vec<String>>,
}
