pub mod order;
pub mod twap;
