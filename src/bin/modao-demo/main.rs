mod cli;
mod demo;

use crate::cli::Cli;

use anyhow::Result;
use clap::Parser;
use modao::{Dao, UserDao};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,modao=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Cli::parse();
    let config = args.to_config()?;

    let dao = Dao::connect(&config).await?;
    if args.drop {
        info!(db = dao.name(), "dropping database");
        dao.drop_db().await?;
    }

    let users = UserDao::new(dao);
    demo::run(&users, args.demo, args.upload.as_deref()).await?;

    info!("✅ Demo finished");
    Ok(())
}
