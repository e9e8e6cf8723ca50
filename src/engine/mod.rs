pub mod context;
pub mod simulation;
