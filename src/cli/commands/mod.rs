pub mod analyze;
pub mod clean;
pub mod components;
pub mod config;
pub mod configs;
pub mod docs;
pub mod export;
pub mod files;
pub mod upload;
pub mod watch;
