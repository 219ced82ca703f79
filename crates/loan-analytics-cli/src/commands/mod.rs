pub mod loan;
pub mod market;
