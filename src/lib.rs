pub mod agent;
pub mod conversation;
pub mod errors;
pub mod hooks;
pub mod pipeline;
pub mod prompt;
pub mod repo;
pub mod resolver;
pub mod session;
pub mod suite;
pub mod suite_config;
pub mod target;
pub mod ui;
