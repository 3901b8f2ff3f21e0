//! Command line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::paging::{PagingConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE: &str = "helpdesk.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct DatabaseArgs {
    /// Path to the SQLite database file
    #[arg(long, env = "HELPDESK_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "HELPDESK_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Page size used when a request does not ask for one
    #[arg(long, env = "HELPDESK_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Largest page size a request may ask for
    #[arg(long, env = "HELPDESK_MAX_PAGE_SIZE", default_value_t = MAX_PAGE_SIZE)]
    pub max_page_size: u32,
}

impl ServeArgs {
    pub fn paging(&self) -> PagingConfig {
        PagingConfig::new(self.page_size, self.max_page_size)
    }
}
