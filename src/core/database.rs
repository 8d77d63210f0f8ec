use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::core::config::DatabaseConfig;

/// Open the PostgreSQL pool backing the parking store
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        "Connecting to {} (connections {}..={}, acquire timeout {}s)",
        redact_url(&config.url),
        config.min_connections,
        config.max_connections,
        config.acquire_timeout_secs
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Host/database part of a connection URL, without credentials
fn redact_url(url: &str) -> &str {
    url.rsplit_once('@').map_or("***", |(_, host)| host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url_drops_credentials() {
        assert_eq!(
            redact_url("postgres://parkit:secret@db:5432/parkit"),
            "db:5432/parkit"
        );
        assert_eq!(redact_url("postgres:///parkit"), "***");
    }
}
