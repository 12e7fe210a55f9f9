pub mod cart;
pub mod ledger;
pub mod lifecycle;
