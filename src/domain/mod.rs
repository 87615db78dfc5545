pub mod commands;
pub mod due_date;
pub mod errors;
pub mod fine;
pub mod loan;
pub mod value_objects;

pub use errors::*;
pub use value_objects::*;
