pub mod application;
pub mod commands;
pub mod domain;
pub mod http;
pub mod infrastructure;
pub mod runtime;
