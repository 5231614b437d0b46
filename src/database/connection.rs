use mongodb::Client;

use crate::config::AppConfig;
use crate::errors::Result;

use super::mongo::MongoDb;

pub async fn get_db_client(config: &AppConfig) -> Result<(Client, MongoDb)> {
    let client = Client::with_uri_str(&config.database_url).await?;
    let db = MongoDb(client.database(&config.database_name));

    match db.list_collection_names().await {
        Ok(collections) => {
            tracing::info!("✅ Connected to database: {}", config.database_name);
            tracing::debug!("📂 Collections found: {:?}", collections);
        }
        Err(e) => {
            tracing::warn!(
                "❌ Database '{}' may not exist or is inaccessible: {}",
                config.database_name,
                e
            );
        }
    }

    Ok((client, db))
}
