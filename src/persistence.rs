use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use crate::audit::log::append_history;
use crate::error::AppError;
use crate::files::backup;
use crate::ledger::Ledger;
use crate::models::SaveReport;
use crate::workbook;

pub fn save(ledger: &mut Ledger) -> Result<SaveReport, AppError> {
  save_at(ledger, &Local::now().naive_local())
}

/// Backup, overwrite, append history. Not transactional: a failed backup is
/// only logged, and a failed history append leaves the new spreadsheet in place
/// with the buffer intact so the next save retries it.
pub fn save_at(ledger: &mut Ledger, stamp: &NaiveDateTime) -> Result<SaveReport, AppError> {
  let path = ledger.path().to_path_buf();
  let backup_name = backup::backup_file_name(&path, stamp);

  let backup_created = match backup::create_backup(&path, stamp) {
    Ok(target) => {
      info!(backup = %target.display(), "backup criado");
      true
    }
    Err(err) => {
      warn!(path = %path.display(), error = %err, "backup ignorado");
      false
    }
  };

  workbook::write_table(&path, ledger.table())?;

  let history_flushed = append_history(ledger.history_path(), ledger.pending_history())?;
  ledger.clear_history();

  info!(path = %path.display(), rows = ledger.len(), history_flushed, "planilha salva");
  Ok(SaveReport {
    backup_name,
    backup_created,
    history_flushed,
  })
}
