pub mod abc;
pub mod validation;
