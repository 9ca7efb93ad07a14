use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::{DbErr, SqlErr};

pub type DbPool = sea_orm::DatabaseConnection;

#[derive(Clone)]
pub struct DBService {
    pub pool: DbPool,
}

impl DBService {
    /// Connects and brings the schema up to date. `database_url` accepts any
    /// backend the migrations support (`sqlite://...?mode=rwc`, `postgres://...`).
    pub async fn new(database_url: &str) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_string());
        options.max_connections(5).sqlx_logging(false);

        let pool = Database::connect(options).await?;
        db_migration::Migrator::up(&pool, None).await?;
        tracing::debug!("Database schema is up to date");

        Ok(DBService { pool })
    }
}
