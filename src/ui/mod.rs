pub mod console;
pub mod types;
