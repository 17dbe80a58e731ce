//! Session-scoped database connection helpers.
//!
//! Two engines: MongoDB for document data and PostgreSQL for relational
//! data. Connections are acquired once at session start and released once
//! at session end with logged confirmation; there is no pooling, no
//! retry-on-disconnect, and no query layer here.

use mongodb::bson::doc;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::fmt;
use std::str::FromStr;

/// Database connection errors, wrapping the driver errors unchanged.
#[derive(Debug)]
pub enum DbError {
    Mongo(mongodb::error::Error),
    Sql(sqlx::Error),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Mongo(err) => write!(f, "MongoDB error: {}", err),
            DbError::Sql(err) => write!(f, "PostgreSQL error: {}", err),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Mongo(err) => Some(err),
            DbError::Sql(err) => Some(err),
        }
    }
}

impl From<mongodb::error::Error> for DbError {
    fn from(err: mongodb::error::Error) -> Self {
        DbError::Mongo(err)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Sql(err)
    }
}

/// Establishes a MongoDB connection and confirms it with a ping.
///
/// The driver connects lazily, so the ping is what actually verifies the
/// server is reachable before the test session starts using it.
pub async fn connect_to_mongodb(connection_string: &str) -> Result<mongodb::Client, DbError> {
    log::info!("Connecting to MongoDB...");
    let client = mongodb::Client::with_uri_str(connection_string).await?;
    client
        .database("admin")
        .run_command(doc! {"ping": 1}, None)
        .await?;
    log::info!("Connection to MongoDB established");
    Ok(client)
}

/// Shuts the MongoDB client down, releasing its connections.
pub async fn close_mongodb_connection(client: mongodb::Client) {
    client.shutdown().await;
    log::info!("Connection to MongoDB closed");
}

/// Establishes a single PostgreSQL connection.
pub async fn connect_to_postgres(
    username: &str,
    password: &str,
    connection_string: &str,
) -> Result<PgConnection, DbError> {
    log::info!("Connecting to PostgreSQL...");
    let options = PgConnectOptions::from_str(connection_string)?
        .username(username)
        .password(password);
    let connection = PgConnection::connect_with(&options).await?;
    log::info!("Connection to PostgreSQL established");
    Ok(connection)
}

/// Closes a PostgreSQL connection cleanly.
pub async fn close_postgres_connection(connection: PgConnection) -> Result<(), DbError> {
    connection.close().await?;
    log::info!("Connection to PostgreSQL closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_display() {
        let err = DbError::Sql(sqlx::Error::PoolClosed);
        assert!(format!("{}", err).starts_with("PostgreSQL error:"));
    }

    #[tokio::test]
    async fn test_connect_to_postgres_bad_url_fails() {
        let result = connect_to_postgres("user", "pass", "not-a-postgres-url").await;
        assert!(matches!(result, Err(DbError::Sql(_))));
    }

    #[tokio::test]
    async fn test_connect_to_mongodb_bad_uri_fails() {
        let result = connect_to_mongodb("not-a-mongodb-uri").await;
        assert!(matches!(result, Err(DbError::Mongo(_))));
    }
}
