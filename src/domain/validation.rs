use crate::error::AppError;
use crate::models::{Location, TransferDirection};

pub fn ensure_quantity_positive(quantity: u64) -> Result<(), AppError> {
  if quantity == 0 {
    Err(AppError::InvalidQuantity(quantity))
  } else {
    Ok(())
  }
}

/// Accepts the arrow forms (`A→B`, `A->B`) and the location short names
/// (`CANOAS->PF`). Anything else is rejected instead of falling back to `B→A`.
pub fn parse_direction(raw: &str) -> Result<TransferDirection, AppError> {
  let normalized: String = raw
    .trim()
    .to_uppercase()
    .replace('→', "->")
    .chars()
    .filter(|c| !c.is_whitespace())
    .collect();
  match normalized.as_str() {
    "A->B" | "CANOAS->PF" | "CANOAS->PASSOFUNDO" => Ok(TransferDirection::AToB),
    "B->A" | "PF->CANOAS" | "PASSOFUNDO->CANOAS" => Ok(TransferDirection::BToA),
    _ => Err(AppError::InvalidDirection(raw.to_string())),
  }
}

pub fn parse_location(raw: &str) -> Result<Location, AppError> {
  let normalized: String = raw.trim().to_uppercase().chars().filter(|c| !c.is_whitespace()).collect();
  match normalized.as_str() {
    "A" | "CANOAS" => Ok(Location::A),
    "B" | "PF" | "PASSOFUNDO" => Ok(Location::B),
    _ => Err(AppError::InvalidLocation(raw.to_string())),
  }
}

pub fn normalize_name(name: &str) -> String {
  name.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_quantity_is_rejected() {
    assert!(matches!(ensure_quantity_positive(0), Err(AppError::InvalidQuantity(0))));
    assert!(ensure_quantity_positive(1).is_ok());
  }

  #[test]
  fn directions_parse_both_spellings() {
    assert_eq!(parse_direction("A→B").unwrap(), TransferDirection::AToB);
    assert_eq!(parse_direction("a -> b").unwrap(), TransferDirection::AToB);
    assert_eq!(parse_direction("Canoas -> PF").unwrap(), TransferDirection::AToB);
    assert_eq!(parse_direction("B→A").unwrap(), TransferDirection::BToA);
    assert_eq!(parse_direction("PF -> Canoas").unwrap(), TransferDirection::BToA);
  }

  #[test]
  fn unknown_direction_is_not_treated_as_reverse() {
    let err = parse_direction("sideways").unwrap_err();
    assert_eq!(err.code(), "INVALID_DIRECTION");
  }

  #[test]
  fn locations_accept_codes_and_names() {
    assert_eq!(parse_location("a").unwrap(), Location::A);
    assert_eq!(parse_location("Passo Fundo").unwrap(), Location::B);
    assert!(parse_location("Porto Alegre").is_err());
  }

  #[test]
  fn names_are_upper_cased() {
    assert_eq!(normalize_name("  parafuso m8 "), "PARAFUSO M8");
    assert_eq!(normalize_name("válvula"), "VÁLVULA");
  }
}
