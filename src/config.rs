use std::env;
use std::str::FromStr;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use thiserror::Error;

pub const PORT: &str = "RECIPES_PORT";
pub const DB_CONNECTION_STRING: &str = "RECIPES_DB_CONNECTION_STRING";
pub const DB_USER: &str = "RECIPES_DB_USER";
pub const DB_PASSWORD: &str = "RECIPES_DB_PASSWORD";
pub const DB_ADDRESS: &str = "RECIPES_DB_ADDRESS";
pub const DB_NAME: &str = "RECIPES_DB_NAME";
pub const DB_MAX_CONNECTIONS: &str = "RECIPES_DB_MAX_CONNECTIONS";
pub const DB_CONNECTION_LIFETIME_SECONDS: &str = "RECIPES_DB_CONNECTION_LIFETIME_SECONDS";
pub const DB_CONNECT_TIMEOUT_SECONDS: &str = "RECIPES_DB_CONNECT_TIMEOUT_SECONDS";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_USER: &str = "recipes";
const DEFAULT_DB_PASSWORD: &str = "";
const DEFAULT_DB_ADDRESS: &str = "db:3306";
const DEFAULT_DB_NAME: &str = "recipes";
const DEFAULT_DB_PORT: u16 = 3306;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DB_CONNECTION_LIFETIME_SECONDS: u64 = 1800;
const DEFAULT_DB_CONNECT_TIMEOUT_SECONDS: u64 = 5;

/// Enumerates errors encountered while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Represents a variable whose value couldn’t be parsed.
    #[error("could not parse {name} ({value:?})")]
    InvalidVariable { name: &'static str, value: String },

    /// Represents a connection string rejected by the database driver.
    #[error("invalid database connection string: {source}")]
    InvalidConnectionString { source: sqlx::Error },
}

/// Settings read once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub port: u16,
    pub db: DbConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DbConfig {
    pub connection: DbConnection,
    pub max_connections: u32,
    pub connection_lifetime: Duration,
    /// How long a request waits for a connection before giving up.
    pub connect_timeout: Duration,
}

/// How to reach the database: either a full URL or its parts.
#[derive(Clone, Debug, PartialEq)]
pub enum DbConnection {
    Url(String),
    Parts {
        user: String,
        password: String,
        host: String,
        port: u16,
        name: String,
    },
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration using `lookup` to find each variable.
    /// Unset variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let variable_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_owned());

        let connection = match lookup(DB_CONNECTION_STRING) {
            Some(url) => DbConnection::Url(url),
            None => {
                let address = variable_or(DB_ADDRESS, DEFAULT_DB_ADDRESS);
                let (host, port) = split_address(&address)?;

                DbConnection::Parts {
                    user: variable_or(DB_USER, DEFAULT_DB_USER),
                    password: variable_or(DB_PASSWORD, DEFAULT_DB_PASSWORD),
                    host,
                    port,
                    name: variable_or(DB_NAME, DEFAULT_DB_NAME),
                }
            }
        };

        let lifetime = parse_variable(&lookup, DB_CONNECTION_LIFETIME_SECONDS, DEFAULT_DB_CONNECTION_LIFETIME_SECONDS)?;
        let timeout = parse_variable(&lookup, DB_CONNECT_TIMEOUT_SECONDS, DEFAULT_DB_CONNECT_TIMEOUT_SECONDS)?;

        Ok(Config {
            port: parse_variable(&lookup, PORT, DEFAULT_PORT)?,
            db: DbConfig {
                connection,
                max_connections: parse_variable(&lookup, DB_MAX_CONNECTIONS, DEFAULT_DB_MAX_CONNECTIONS)?,
                connection_lifetime: Duration::from_secs(lifetime),
                connect_timeout: Duration::from_secs(timeout),
            },
        })
    }
}

impl DbConfig {
    /// Returns the pool settings: size, connection lifetime and how long
    /// to wait for a connection.
    pub fn pool_options(&self) -> MySqlPoolOptions {
        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .max_lifetime(self.connection_lifetime)
            .connect_timeout(self.connect_timeout)
    }

    /// Returns the options to pass to the connection pool.
    pub fn connect_options(&self) -> Result<MySqlConnectOptions, ConfigError> {
        match &self.connection {
            DbConnection::Url(url) => MySqlConnectOptions::from_str(url)
                .map_err(|source| ConfigError::InvalidConnectionString { source }),
            DbConnection::Parts {
                user,
                password,
                host,
                port,
                name,
            } => Ok(MySqlConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(name)),
        }
    }
}

fn parse_variable<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVariable { name, value }),
        None => Ok(default),
    }
}

/// Splits `host[:port]`, defaulting to the standard MySQL port.
fn split_address(address: &str) -> Result<(String, u16), ConfigError> {
    match address.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse().map_err(|_| ConfigError::InvalidVariable {
                name: DB_ADDRESS,
                value: address.to_owned(),
            })?;

            Ok((host.to_owned(), port))
        }
        None => Ok((address.to_owned(), DEFAULT_DB_PORT)),
    }
}
