pub mod budget;
pub mod summary;
pub mod transaction;
