use std::path::PathBuf;

use rust_xlsxwriter::XlsxError;
use serde::ser::SerializeStruct;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Planilha ilegivel: {0}")]
  Load(String),

  #[error("Saldo insuficiente. Disp: {available}")]
  InsufficientBalance { available: u64 },

  #[error("Arquivo aberto em outro programa ({}). Feche-o antes de salvar.", .0.display())]
  FileLocked(PathBuf),

  #[error("Linha {index} invalida (tabela com {len} linhas)")]
  Index { index: usize, len: usize },

  #[error("Quantidade invalida: {0}")]
  InvalidQuantity(u64),

  #[error("Direcao de transferencia desconhecida: {0}")]
  InvalidDirection(String),

  #[error("Local desconhecido: {0}")]
  InvalidLocation(String),

  #[error("Item nao encontrado: {0}")]
  ItemNotFound(String),

  #[error("Historico nao encontrado: {}", .0.display())]
  HistoryMissing(PathBuf),

  #[error("Configuracao: {0}")]
  Settings(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error("Exportacao falhou: {0}")]
  Export(String),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl AppError {
  pub fn code(&self) -> &'static str {
    match self {
      AppError::Load(_) => "LOAD_ERROR",
      AppError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
      AppError::FileLocked(_) => "FILE_LOCKED",
      AppError::Index { .. } => "INDEX_ERROR",
      AppError::InvalidQuantity(_) => "INVALID_QUANTITY",
      AppError::InvalidDirection(_) => "INVALID_DIRECTION",
      AppError::InvalidLocation(_) => "INVALID_LOCATION",
      AppError::ItemNotFound(_) => "ITEM_NOT_FOUND",
      AppError::HistoryMissing(_) => "HISTORY_NOT_FOUND",
      AppError::Settings(_) => "SETTINGS_ERROR",
      AppError::Io(_) => "IO_ERROR",
      AppError::Export(_) => "EXPORT",
      AppError::Json(_) => "JSON_ERROR",
    }
  }

  /// Maps a write failure on `path` to `FileLocked` when the OS refused access,
  /// otherwise keeps it as a plain I/O error.
  pub fn from_write(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
    if is_locked(&err) {
      AppError::FileLocked(path.into())
    } else {
      AppError::Io(err)
    }
  }
}

// 32/33 are ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION on Windows.
fn is_locked(err: &std::io::Error) -> bool {
  err.kind() == std::io::ErrorKind::PermissionDenied || matches!(err.raw_os_error(), Some(32) | Some(33))
}

impl Serialize for AppError {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("AppError", 2)?;
    state.serialize_field("code", self.code())?;
    state.serialize_field("message", &self.to_string())?;
    state.end()
  }
}

impl From<XlsxError> for AppError {
  fn from(err: XlsxError) -> Self {
    match err {
      XlsxError::IoError(io) => AppError::Io(io),
      other => AppError::Export(other.to_string()),
    }
  }
}

impl From<calamine::Error> for AppError {
  fn from(err: calamine::Error) -> Self {
    AppError::Load(err.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn permission_denied_is_reported_as_locked() {
    let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
    let mapped = AppError::from_write(err, "estoque.xlsx");
    assert_eq!(mapped.code(), "FILE_LOCKED");
    assert!(mapped.to_string().contains("Feche-o antes de salvar"));
  }

  #[test]
  fn other_io_errors_stay_io() {
    let err = std::io::Error::from(std::io::ErrorKind::NotFound);
    assert_eq!(AppError::from_write(err, "x.xlsx").code(), "IO_ERROR");
  }

  #[test]
  fn serializes_code_and_message() {
    let json = serde_json::to_value(AppError::InsufficientBalance { available: 3 }).unwrap();
    assert_eq!(json["code"], "INSUFFICIENT_BALANCE");
    assert_eq!(json["message"], "Saldo insuficiente. Disp: 3");
  }
}
