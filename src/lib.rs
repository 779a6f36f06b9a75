pub mod artifact;
pub mod config;
pub mod errors;
pub mod external;
pub mod match_info;
pub mod orchestrator;
pub mod roster;
pub mod ui;
