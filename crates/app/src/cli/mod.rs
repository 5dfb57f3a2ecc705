use std::time::Duration;

use clap::{Parser, Subcommand};
use storefront_app::database::{self, Db, PoolConfig};

mod account;
mod db;
mod product;
mod session;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Account(account::AccountCommand),
    Product(product::ProductCommand),
    Session(session::SessionCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Account(command) => account::run(command).await,
            Commands::Product(command) => product::run(command).await,
            Commands::Session(command) => session::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

/// One-shot commands never need more than a couple of connections.
const CLI_POOL: PoolConfig = PoolConfig {
    max_connections: 2,
    acquire_timeout: Duration::from_secs(10),
};

pub(crate) async fn connect(database_url: &str) -> Result<Db, String> {
    database::connect(database_url, CLI_POOL)
        .await
        .map(Db::new)
        .map_err(|error| format!("failed to connect to database: {error}"))
}
