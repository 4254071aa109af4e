use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::CalendarResult;

pub async fn get_db_pool(config: &Config) -> CalendarResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    info!("connected to database (max {} connections)", config.max_connections);
    Ok(pool)
}
