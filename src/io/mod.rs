pub mod csv;
pub mod results;
