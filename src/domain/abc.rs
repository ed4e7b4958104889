use crate::models::AbcClass;

pub const CLASS_A_ABOVE: u64 = 50;
pub const CLASS_B_ABOVE: u64 = 10;

pub fn classify(exits: u64) -> AbcClass {
  if exits > CLASS_A_ABOVE {
    AbcClass::A
  } else if exits > CLASS_B_ABOVE {
    AbcClass::B
  } else {
    AbcClass::C
  }
}

/// Operation names counted as stock leaving. `BAIXA` comes from older files.
pub fn is_exit_operation(operation: &str) -> bool {
  let upper = operation.trim().to_uppercase();
  upper.contains("SAIDA") || upper.contains("BAIXA")
}
