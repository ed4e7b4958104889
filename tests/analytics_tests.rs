mod common;

use std::fs;

use common::table_with;
use estoque_ledger::models::{AbcClass, Location, Movement};
use estoque_ledger::{persistence, reports, Ledger};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn abc_from_mixed_history_file() {
  let dir = tempdir().unwrap();
  let ledger = Ledger::from_table(dir.path().join("estoque.xlsx"), table_with(vec![("Z", 0, 0), ("Y", 0, 0), ("X", 0, 0)]));
  fs::write(
    ledger.history_path(),
    "\
01/01/2023 08:00:00 | SAIDA | X | 40 | Canoas
02/01/2023 08:00:00 | BAIXA | Y | 5 | Canoas
registro corrompido
05/03/2024 14:07:09;;;SAIDA;;;X;;;20;;;SAIDA em Canoas
05/03/2024 14:08:00;;;SAIDA;;;Y;;;6;;;SAIDA em Passo Fundo
05/03/2024 14:09:00;;;ENTRADA;;;Z;;;500;;;ENTRADA em Canoas
05/03/2024 14:10:00;;;TRANSF;;;Z;;;30;;;A→B
",
  )
  .unwrap();

  let ranking = reports::classify_abc(ledger.rows(), ledger.history_path()).unwrap();
  let summary: Vec<_> = ranking.iter().map(|row| (row.name.as_str(), row.exits, row.class)).collect();
  assert_eq!(summary, vec![("X", 60, AbcClass::A), ("Y", 11, AbcClass::B), ("Z", 0, AbcClass::C)]);
}

#[test]
fn separator_and_line_breaks_in_names_survive_the_history() {
  let dir = tempdir().unwrap();
  let mut ledger = Ledger::from_table(dir.path().join("estoque.xlsx"), table_with(vec![("FIO;", 20, 0)]));
  ledger.add_item("cabo;;;azul", 100, 0);
  ledger.add_item("cabo\nverde", 20, 0);
  ledger.move_stock(1, Movement::Exit(Location::A), 60).unwrap();
  ledger.move_stock(2, Movement::Exit(Location::A), 12).unwrap();
  ledger.move_stock(0, Movement::Exit(Location::A), 3).unwrap();
  persistence::save(&mut ledger).unwrap();

  let content = fs::read_to_string(ledger.history_path()).unwrap();
  assert_eq!(content.lines().count(), 5);

  let ranking = reports::classify_abc(ledger.rows(), ledger.history_path()).unwrap();
  let summary: Vec<_> = ranking.iter().map(|row| (row.name.as_str(), row.exits, row.class)).collect();
  assert_eq!(
    summary,
    vec![("CABO;;;AZUL", 60, AbcClass::A), ("CABO\nVERDE", 12, AbcClass::B), ("FIO;", 3, AbcClass::C)]
  );
}

#[test]
fn abc_reads_what_save_wrote() {
  let dir = tempdir().unwrap();
  let mut ledger = Ledger::from_table(dir.path().join("estoque.xlsx"), table_with(vec![("CABO", 100, 0), ("TUBO", 5, 0)]));
  ledger.move_stock(1, Movement::Exit(Location::A), 5).unwrap();
  ledger.move_stock(0, Movement::Exit(Location::A), 30).unwrap();
  persistence::save(&mut ledger).unwrap();

  let ranking = reports::classify_abc(ledger.rows(), ledger.history_path()).unwrap();
  assert_eq!(ranking[0].name, "CABO");
  assert_eq!(ranking[0].class, AbcClass::B);
  assert_eq!(ranking[1].class, AbcClass::C);
}

#[test]
fn abc_without_history_file() {
  let dir = tempdir().unwrap();
  let ledger = Ledger::from_table(dir.path().join("estoque.xlsx"), table_with(vec![("CABO", 1, 0)]));
  let err = reports::classify_abc(ledger.rows(), ledger.history_path()).unwrap_err();
  assert_eq!(err.code(), "HISTORY_NOT_FOUND");
}

#[test]
fn stock_report_lists_only_items_with_balance() {
  let ledger = Ledger::from_table("/tmp/estoque.xlsx", table_with(vec![("A", 0, 0), ("B", 0, 2), ("C", 1, 0), ("D", 0, 0)]));
  let report = reports::current_stock_report(ledger.rows());
  let summary: Vec<_> = report.iter().map(|row| (row.display_id, row.name.as_str())).collect();
  assert_eq!(summary, vec![(3, "B"), (4, "C")]);
}
