pub mod simulation;
pub mod site;
pub mod weather;
