pub mod budget_repository;
pub mod connection;
pub mod repository;
pub mod transaction_repository;
