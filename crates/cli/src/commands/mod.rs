//! CLI subcommand implementations.

pub mod migrate;
pub mod user;

use secrecy::SecretString;

/// Environment variable holding the connection string.
pub const DATABASE_URL_VAR: &str = "PETS_DATABASE_URL";

/// Read the database URL, falling back to the generic `DATABASE_URL`.
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var(DATABASE_URL_VAR)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
