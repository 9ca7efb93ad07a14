use std::{sync::Arc, time::Duration};

use anyhow::Context;
use db::DBService;
use services::services::{
    config::Config, generation::GenerationService, identity::IdentityService,
};

pub mod error;
pub mod http;
pub mod routes;

const EXTERNAL_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared per-request state: the connection pool and the two external
/// service clients, all cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    db: DBService,
    identity: IdentityService,
    generation: GenerationService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db = DBService::new(&config.database_url)
            .await
            .context("failed to initialize database")?;

        let client = reqwest::Client::builder()
            .timeout(EXTERNAL_REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let identity = IdentityService::new(client.clone(), config.identity.clone());
        let generation = GenerationService::new(client, config.generation.clone());

        Ok(Self {
            config: Arc::new(config),
            db,
            identity,
            generation,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn identity(&self) -> &IdentityService {
        &self.identity
    }

    pub fn generation(&self) -> &GenerationService {
        &self.generation
    }
}
