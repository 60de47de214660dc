//! Shared setup for the DAO integration tests.
//!
//! Each test gets its own MongoDB container, so Docker must be available.

use modao::{Dao, MongoConfig};
use std::time::Duration;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::mongo::Mongo;

pub struct TestMongo {
    _container: ContainerAsync<Mongo>,
    dao: Dao,
}

impl TestMongo {
    /// Starts a standalone MongoDB container and connects a [`Dao`] to it.
    pub async fn new() -> Self {
        let container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let config = MongoConfig {
            db_name: "modao_test".to_string(),
            addrs: vec![format!("127.0.0.1:{}", port)],
            timeout_secs: 5,
            ..Default::default()
        };
        let dao = Self::connect_with_retry(&config, 30).await;

        Self {
            _container: container,
            dao,
        }
    }

    pub fn dao(&self) -> Dao {
        self.dao.clone()
    }

    async fn connect_with_retry(config: &MongoConfig, max_attempts: u32) -> Dao {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match Dao::connect(config).await {
                Ok(dao) => return dao,
                Err(e) => {
                    if attempts >= max_attempts {
                        panic!("Failed to connect to MongoDB after {} attempts: {}", max_attempts, e);
                    }
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}
