pub mod auth;
pub mod changes;
pub mod cli;
pub mod client_factory;
pub mod commands;
pub mod config;
pub mod error;
pub mod gerrit;
pub mod labels;
pub mod prompt;

// Make mock_gerrit available for workflow and integration testing
pub mod mock_gerrit;
