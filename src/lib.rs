// Library for tests to access modules

pub mod cli;
pub mod cloudwatch_repo;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod report;
pub mod selector;
pub mod state;
pub mod version;
