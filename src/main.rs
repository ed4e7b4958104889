use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

use estoque_ledger::commands::{self, AppState, MutationOutcome};
use estoque_ledger::domain::validation;
use estoque_ledger::error::AppError;
use estoque_ledger::models::{Movement, StockFilter};
use estoque_ledger::reports;

#[derive(Parser)]
#[command(name = "estoque", about = "Controle de estoque Canoas / Passo Fundo sobre planilha Excel.")]
struct Cli {
  /// Planilha de estoque. Sem ela, usa a ultima aberta.
  #[arg(long, global = true, value_name = "PATH")]
  file: Option<PathBuf>,

  /// Saida em JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Lista os itens, com filtro de saldo e busca por nome.
  Show {
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    filter: FilterArg,
    #[arg(long)]
    search: Option<String>,
  },
  /// Soma dos saldos por local.
  Totals,
  /// Cadastra um item novo.
  Add {
    name: String,
    #[arg(long, default_value_t = 0)]
    a: u64,
    #[arg(long, default_value_t = 0)]
    b: u64,
  },
  /// Exclui o item na posicao informada.
  Remove { index: usize },
  /// Entrada de estoque em um local.
  Entry {
    index: usize,
    quantity: u64,
    #[arg(long)]
    location: String,
  },
  /// Saida de estoque de um local.
  Exit {
    index: usize,
    quantity: u64,
    #[arg(long)]
    location: String,
  },
  /// Transferencia entre locais (A→B ou B→A).
  Transfer {
    index: usize,
    quantity: u64,
    #[arg(long)]
    direction: String,
  },
  /// Curva ABC pelas saidas do historico.
  Abc {
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
  },
  /// Itens com saldo.
  Stock {
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
  },
  /// Backups existentes da planilha, mais novos primeiro.
  Backups,
  /// Foto do produto.
  Image {
    #[command(subcommand)]
    action: ImageAction,
  },
}

#[derive(Subcommand)]
enum ImageAction {
  Find { index: usize },
  Save { index: usize, source: PathBuf },
  Delete { index: usize },
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
  All,
  PositiveA,
  ZeroA,
  PositiveB,
  ZeroB,
}

impl From<FilterArg> for StockFilter {
  fn from(value: FilterArg) -> Self {
    match value {
      FilterArg::All => StockFilter::All,
      FilterArg::PositiveA => StockFilter::PositiveA,
      FilterArg::ZeroA => StockFilter::ZeroA,
      FilterArg::PositiveB => StockFilter::PositiveB,
      FilterArg::ZeroB => StockFilter::ZeroB,
    }
  }
}

const DEFAULT_LOG_LEVEL: &str = "warn";

/// `RUST_LOG` wins over the configured level.
fn filter_directive(from_env: Option<&str>, configured: &str) -> String {
  match from_env.map(str::trim).filter(|value| !value.is_empty()) {
    Some(value) => value.to_string(),
    None => configured.to_string(),
  }
}

/// Starts at `RUST_LOG` or `warn` so app-dir and settings loading are traced.
/// The returned handle switches to the configured level once settings are known.
fn init_tracing() -> reload::Handle<EnvFilter, Registry> {
  let directive = filter_directive(std::env::var("RUST_LOG").ok().as_deref(), DEFAULT_LOG_LEVEL);
  let (filter, handle) = reload::Layer::new(EnvFilter::new(directive));
  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();
  handle
}

fn apply_log_level(handle: &reload::Handle<EnvFilter, Registry>, configured: &str) {
  let directive = filter_directive(std::env::var("RUST_LOG").ok().as_deref(), configured);
  if let Err(err) = handle.reload(EnvFilter::new(&directive)) {
    tracing::warn!(error = %err, directive = %directive, "nivel de log nao aplicado");
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  let json = cli.json;
  let log_handle = init_tracing();

  let result = AppState::init().and_then(|mut state| {
    apply_log_level(&log_handle, &state.settings.log_level);
    run(cli, &mut state)
  });

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      if json {
        println!("{}", serde_json::to_string(&err).unwrap_or_else(|_| err.to_string()));
      } else {
        eprintln!("{}: {err}", err.code());
      }
      ExitCode::FAILURE
    }
  }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<(), AppError> {
  if json {
    println!("{}", serde_json::to_string_pretty(value)?);
  } else {
    println!("{}", text());
  }
  Ok(())
}

fn saved(outcome: &MutationOutcome) -> String {
  let backup = if outcome.save.backup_created {
    outcome.save.backup_name.clone()
  } else {
    format!("{} (nao criado)", outcome.save.backup_name)
  };
  format!("{}: salvo. Backup: {backup}", outcome.item)
}

fn run(cli: Cli, state: &mut AppState) -> Result<(), AppError> {
  let json = cli.json;
  let mut ledger = commands::open_ledger(state, cli.file)?;
  let label_a = state.settings.location_a_label.clone();
  let label_b = state.settings.location_b_label.clone();

  match cli.command {
    Command::Show { filter, search } => {
      let rows = commands::show(&ledger, filter.into(), search.as_deref());
      emit(json, &rows, || {
        let mut out = format!("{:>5}  {:>8}  {:<40} {:>10} {:>12}", "POS", "ID", "PRODUTO", label_a, label_b);
        for row in &rows {
          out.push_str(&format!(
            "\n{:>5}  {:>8}  {:<40} {:>10} {:>12}",
            row.position, row.display_id, row.name, row.balance_a, row.balance_b
          ));
        }
        out
      })
    }
    Command::Totals => {
      let totals = commands::totals(Some(&ledger));
      emit(json, &totals, || format!("{label_a}: {}\n{label_b}: {}", totals.a, totals.b))
    }
    Command::Add { name, a, b } => {
      let outcome = commands::add_item(&mut ledger, &name, a, b)?;
      emit(json, &outcome, || saved(&outcome))
    }
    Command::Remove { index } => {
      let outcome = commands::remove_item(&mut ledger, index)?;
      emit(json, &outcome, || saved(&outcome))
    }
    Command::Entry { index, quantity, location } => {
      let movement = Movement::Entry(validation::parse_location(&location)?);
      let outcome = commands::move_stock(&mut ledger, index, movement, quantity)?;
      emit(json, &outcome, || saved(&outcome))
    }
    Command::Exit { index, quantity, location } => {
      let movement = Movement::Exit(validation::parse_location(&location)?);
      let outcome = commands::move_stock(&mut ledger, index, movement, quantity)?;
      emit(json, &outcome, || saved(&outcome))
    }
    Command::Transfer { index, quantity, direction } => {
      let movement = Movement::Transfer(validation::parse_direction(&direction)?);
      let outcome = commands::move_stock(&mut ledger, index, movement, quantity)?;
      emit(json, &outcome, || saved(&outcome))
    }
    Command::Abc { export } => {
      let ranking = commands::abc_ranking(&ledger)?;
      let table = reports::abc_table(&ranking);
      if let Some(path) = export {
        commands::export_report(&table, &path)?;
      }
      emit(json, &ranking, || render(&table))
    }
    Command::Stock { export } => {
      let report = commands::stock_report(&ledger);
      let table = reports::stock_table(&report, &label_a, &label_b);
      if let Some(path) = export {
        commands::export_report(&table, &path)?;
      }
      emit(json, &report, || render(&table))
    }
    Command::Backups => {
      let backups = commands::list_backups(&ledger)?;
      emit(json, &backups, || {
        backups
          .iter()
          .map(|info| format!("{}  {}  {} bytes", info.modified.as_deref().unwrap_or("-"), info.name, info.size))
          .collect::<Vec<_>>()
          .join("\n")
      })
    }
    Command::Image { action } => match action {
      ImageAction::Find { index } => {
        let found = commands::find_image(state, &ledger, index)?;
        emit(json, &found, || {
          found
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "[Sem Foto]".to_string())
        })
      }
      ImageAction::Save { index, source } => {
        let stored = commands::save_image(state, &ledger, index, &source)?;
        emit(json, &stored, || format!("Foto salva: {}", stored.display()))
      }
      ImageAction::Delete { index } => {
        let removed = commands::delete_image(state, &ledger, index)?;
        emit(json, &removed, || if removed { "Foto removida".to_string() } else { "Nenhuma foto".to_string() })
      }
    },
  }
}

fn render(table: &estoque_ledger::models::ReportTable) -> String {
  let mut out = table.title.clone();
  out.push('\n');
  out.push_str(&table.header.join(" | "));
  for row in &table.rows {
    out.push('\n');
    out.push_str(&row.join(" | "));
  }
  out
}
