//! Driver client construction and connection

use crate::config::MongoConfig;
use crate::error::Result;
use bson::doc;
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::{Client, Database};
use tracing::info;

/// Builds driver options from the configuration without touching the network.
pub fn client_options(config: &MongoConfig) -> Result<ClientOptions> {
    let hosts = config
        .addrs_or_default()
        .iter()
        .map(|addr| ServerAddress::parse(addr))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut options = ClientOptions::default();
    options.hosts = hosts;
    options.app_name = Some("modao".to_string());
    options.connect_timeout = Some(config.timeout());
    options.server_selection_timeout = Some(config.timeout());

    if let Some((username, password)) = config.credentials() {
        let mut credential = Credential::default();
        credential.username = Some(username.to_string());
        credential.password = Some(password.to_string());
        credential.source = Some(config.db_name.clone());
        options.credential = Some(credential);
    }

    if let Some(rs) = config.replica_set() {
        options.repl_set_name = Some(rs.to_string());
    }

    Ok(options)
}

/// Connects and pings the server, so an unreachable deployment fails here
/// instead of on the first query.
pub async fn connect(config: &MongoConfig) -> Result<Client> {
    let client = Client::with_options(client_options(config)?)?;
    client.database("admin").run_command(doc! { "ping": 1 }).await?;
    info!(
        db = %config.db_name,
        addrs = ?config.addrs_or_default(),
        replica_set = ?config.replica_set(),
        "connected to MongoDB"
    );
    Ok(client)
}

pub async fn connect_database(config: &MongoConfig) -> Result<Database> {
    let client = connect(config).await?;
    Ok(client.database(&config.db_name))
}
