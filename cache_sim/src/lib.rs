pub mod cache;
pub mod config;
pub mod line;
pub mod scenario;
pub mod stat;
pub mod trace;
