// src/bin/modao-demo/cli.rs
use anyhow::Result;
use clap::{Parser, ValueEnum};
use modao::MongoConfig;

/// Which tutorial scenario to run
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Demo {
    All,
    Create,
    Upsert,
    Update,
    UpdateEmbed,
    UpdateArray,
    Comment,
    Find,
    Select,
    FindArray,
    Fuzzy,
    Pipe,
    GridFs,
    Errors,
    Json,
    Remove,
}

/// CLI arguments for modao-demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database server address; repeat the flag for a cluster
    #[arg(long = "db-addr")]
    pub db_addr: Vec<String>,

    /// Enable database authorization
    #[arg(long)]
    pub db_auth: bool,

    /// Enable replica set mode
    #[arg(long)]
    pub db_rs: bool,

    /// Database name for the app
    #[arg(long)]
    pub db_name: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Replica set name
    #[arg(long)]
    pub rs: Option<String>,

    /// Connect timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// YAML file with connection settings; flags override it
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, value_enum, default_value_t = Demo::All)]
    pub demo: Demo,

    /// Drop the database before running
    #[arg(long)]
    pub drop: bool,

    /// Extra file to store through GridFS in the gridfs demo
    #[arg(long)]
    pub upload: Option<String>,
}

impl Cli {
    pub fn to_config(&self) -> Result<MongoConfig> {
        let mut config = match &self.config {
            Some(path) => MongoConfig::from_yaml_file(path)?,
            None => MongoConfig::default(),
        };

        if !self.db_addr.is_empty() {
            config.addrs = self.db_addr.clone();
        }
        if self.db_auth {
            config.enable_auth = true;
        }
        if self.db_rs {
            config.enable_rs = true;
        }
        if let Some(name) = &self.db_name {
            config.db_name = name.clone();
        }
        if let Some(username) = &self.username {
            config.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if let Some(rs) = &self.rs {
            config.rs_name = rs.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        Ok(config)
    }
}
