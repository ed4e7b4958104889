use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Duration, Local};
use rand::Rng;

use estoque_ledger::audit::log::{append_history, format_timestamp};
use estoque_ledger::error::AppError;
use estoque_ledger::models::{CellValue, HistoryEntry, ItemRow, Operation, StockTable};
use estoque_ledger::settings;
use estoque_ledger::{workbook, Ledger};

const PRODUCTS: [&str; 12] = [
  "PARAFUSO",
  "PORCA",
  "ARRUELA",
  "CABO",
  "TUBO",
  "LUVA",
  "CONECTOR",
  "FITA",
  "BROCA",
  "DISJUNTOR",
  "TOMADA",
  "ABRACADEIRA",
];
const SIZES: [&str; 6] = ["M4", "M6", "M8", "1/2\"", "3/4\"", "10MM"];
const SUPPLIERS: [&str; 4] = ["Ferragens Sul", "Distribuidora Planalto", "Eletrica Gaucha", "Importadora RS"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let count = std::env::args()
    .nth(1)
    .and_then(|value| value.parse::<usize>().ok())
    .unwrap_or(200);

  let target = match std::env::args().nth(2).or_else(|| std::env::var("ESTOQUE_SEED_FILE").ok()) {
    Some(path) => PathBuf::from(path),
    None => settings::resolve_app_dir()?.join("estoque_demo.xlsx"),
  };

  let (ledger, history_lines) = seed_mock_data(&target, count)?;
  println!(
    "{} itens em {} e {} linhas de historico em {}",
    ledger.len(),
    target.display(),
    history_lines,
    ledger.history_path().display()
  );
  Ok(())
}

fn seed_mock_data(target: &Path, count: usize) -> Result<(Ledger, usize), AppError> {
  let mut rng = rand::thread_rng();
  let mut table = StockTable {
    sheet_name: "Estoque".to_string(),
    header: vec![
      "ID".to_string(),
      "PRODUTO".to_string(),
      "CANOAS".to_string(),
      "PASSO FUNDO".to_string(),
      "FORNECEDOR".to_string(),
    ],
    rows: Vec::new(),
  };
  for index in 0..count {
    let product = PRODUCTS[rng.gen_range(0..PRODUCTS.len())];
    let size = SIZES[rng.gen_range(0..SIZES.len())];
    table.rows.push(ItemRow {
      id: CellValue::Number((index + 1) as f64),
      name: format!("{product} {size} #{}", index + 1),
      balance_a: rng.gen_range(0..120),
      balance_b: rng.gen_range(0..60),
      extra: vec![CellValue::Text(SUPPLIERS[rng.gen_range(0..SUPPLIERS.len())].to_string())],
    });
  }
  let ledger = Ledger::from_table(target, table);
  workbook::write_table(target, ledger.table())?;

  let start = Local::now().naive_local() - Duration::days(365);
  let mut entries = Vec::new();
  let mut legacy = Vec::new();

  for row in ledger.rows() {
    let movements = rng.gen_range(0..8);
    for _ in 0..movements {
      let timestamp = start + Duration::minutes(rng.gen_range(0..525_600));
      let quantity = rng.gen_range(1..20u64);
      if rng.gen_bool(0.3) {
        legacy.push(format!("{} | BAIXA | {} | {} | Canoas", format_timestamp(&timestamp), row.name, quantity));
      } else {
        entries.push(HistoryEntry {
          timestamp,
          operation: Operation::Saida,
          item_name: row.name.clone(),
          quantity,
          detail: "SAIDA em Canoas".to_string(),
        });
      }
    }
  }

  let mut lines = append_history(ledger.history_path(), &entries)?;
  let file = OpenOptions::new().create(true).append(true).open(ledger.history_path())?;
  let mut writer = BufWriter::new(file);
  for line in &legacy {
    writeln!(writer, "{line}")?;
  }
  writer.flush()?;
  lines += legacy.len();

  Ok((ledger, lines))
}
