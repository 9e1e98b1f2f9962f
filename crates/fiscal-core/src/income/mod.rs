pub mod salary;

pub use salary::{hourly_wage, salary_per_month, salary_per_year};
