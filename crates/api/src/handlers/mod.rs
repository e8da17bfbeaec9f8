pub mod assistant;
pub mod dishes;
pub mod predictions;
pub mod reports;
