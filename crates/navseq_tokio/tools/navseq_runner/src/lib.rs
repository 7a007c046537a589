pub mod config;
pub mod plan_file;
pub mod sink;
