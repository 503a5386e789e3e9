pub mod advice;
pub mod aggregation;
pub mod budget;
pub mod budget_status;
pub mod summary;
pub mod transactions;
