pub mod background;
pub mod bonus;
pub mod config;
pub mod core_api;
pub mod fields;
pub mod mannerism;
pub mod roller;
pub mod ruleset;
pub mod tables;
