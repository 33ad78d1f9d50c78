pub mod employee;
pub mod payroll;
pub mod project;
pub mod task;
