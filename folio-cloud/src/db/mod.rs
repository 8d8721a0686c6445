//! Database access layer

pub mod accounts;
pub mod audit;
pub mod payments;
pub mod portfolios;
