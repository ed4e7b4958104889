use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::export::{csv, excel};
use crate::files::backup;
use crate::files::images::ImageStore;
use crate::ledger::Ledger;
use crate::models::*;
use crate::persistence;
use crate::reports;
use crate::settings;

pub struct AppState {
  pub app_dir: PathBuf,
  pub settings: Settings,
}

impl AppState {
  pub fn init() -> Result<Self, AppError> {
    Self::with_dir(settings::resolve_app_dir()?)
  }

  pub fn with_dir(app_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
    let app_dir = app_dir.into();
    let settings = settings::load_settings(&app_dir)?;
    Ok(Self { app_dir, settings })
  }
}

#[derive(Debug, Serialize)]
pub struct MutationOutcome {
  pub item: String,
  pub save: SaveReport,
}

/// Opens `file`, or the last spreadsheet used when none is given, and remembers it.
pub fn open_ledger(state: &mut AppState, file: Option<PathBuf>) -> Result<Ledger, AppError> {
  let path = file
    .or_else(|| state.settings.last_file.as_ref().map(PathBuf::from))
    .ok_or_else(|| AppError::Load("Nenhuma planilha informada (use --file)".to_string()))?;
  let ledger = Ledger::load(&path)?;

  let remembered = path.to_string_lossy().to_string();
  if state.settings.last_file.as_deref() != Some(remembered.as_str()) {
    state.settings.last_file = Some(remembered);
    settings::save_settings(&state.app_dir, &state.settings)?;
  }
  Ok(ledger)
}

pub fn show(ledger: &Ledger, filter: StockFilter, search: Option<&str>) -> Vec<StockViewRow> {
  reports::stock_view(ledger.rows(), filter, search)
}

pub fn totals(ledger: Option<&Ledger>) -> Totals {
  ledger.map(Ledger::totals).unwrap_or(Totals { a: 0, b: 0 })
}

pub fn add_item(ledger: &mut Ledger, name: &str, qty_a: u64, qty_b: u64) -> Result<MutationOutcome, AppError> {
  let item = ledger.add_item(name, qty_a, qty_b);
  commit(ledger, item)
}

pub fn remove_item(ledger: &mut Ledger, index: usize) -> Result<MutationOutcome, AppError> {
  let item = ledger.remove_item(index)?;
  commit(ledger, item)
}

pub fn move_stock(ledger: &mut Ledger, index: usize, movement: Movement, quantity: u64) -> Result<MutationOutcome, AppError> {
  let item = ledger.move_stock(index, movement, quantity)?;
  commit(ledger, item)
}

fn commit(ledger: &mut Ledger, item: String) -> Result<MutationOutcome, AppError> {
  let save = persistence::save(ledger)?;
  info!(item = %item, backup = %save.backup_name, "alteracao salva");
  Ok(MutationOutcome { item, save })
}

pub fn abc_ranking(ledger: &Ledger) -> Result<Vec<AbcRow>, AppError> {
  reports::classify_abc(ledger.rows(), ledger.history_path())
}

pub fn stock_report(ledger: &Ledger) -> Vec<StockReportRow> {
  reports::current_stock_report(ledger.rows())
}

/// Format follows the extension: `.csv` or `.xlsx`.
pub fn export_report(report: &ReportTable, path: &Path) -> Result<(), AppError> {
  let extension = path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(str::to_ascii_lowercase)
    .unwrap_or_default();
  match extension.as_str() {
    "csv" => csv::export_report_csv(report, path),
    "xlsx" => excel::export_report_xlsx(report, path),
    other => Err(AppError::Export(format!("Formato de exportacao nao suportado: '{other}'"))),
  }?;
  info!(path = %path.display(), rows = report.rows.len(), "relatorio exportado");
  Ok(())
}

pub fn list_backups(ledger: &Ledger) -> Result<Vec<BackupInfo>, AppError> {
  backup::list_backups(ledger.path())
}

fn image_store(state: &AppState) -> Result<ImageStore, AppError> {
  ImageStore::open(&state.settings.image_folder)
}

fn item_name(ledger: &Ledger, index: usize) -> Result<String, AppError> {
  Ok(ledger.row(index)?.name.clone())
}

pub fn find_image(state: &AppState, ledger: &Ledger, index: usize) -> Result<Option<PathBuf>, AppError> {
  Ok(image_store(state)?.find(&item_name(ledger, index)?))
}

pub fn save_image(state: &AppState, ledger: &Ledger, index: usize, source: &Path) -> Result<PathBuf, AppError> {
  image_store(state)?.save(source, &item_name(ledger, index)?)
}

pub fn delete_image(state: &AppState, ledger: &Ledger, index: usize) -> Result<bool, AppError> {
  Ok(image_store(state)?.delete(&item_name(ledger, index)?))
}
