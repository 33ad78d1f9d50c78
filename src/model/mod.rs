pub mod employee;
pub mod project;
pub mod salary;
pub mod task;
