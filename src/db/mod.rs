use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::errors::AuthzResult;

pub mod row_parsers;
pub mod store;

pub use store::SqliteStore;

pub async fn connect(database_url: &str) -> AuthzResult<SqlitePool> {
	let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(10)
		.min_connections(1)
		.acquire_timeout(Duration::from_secs(10))
		.connect_with(options)
		.await?;

	Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> AuthzResult<()> {
	sqlx::migrate!().run(pool).await?;
	Ok(())
}

/// Builds `?, ?, ?` for an `IN (...)` clause with `n` bind parameters.
pub(crate) fn placeholders(n: usize) -> String {
	vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_placeholders() {
		assert_eq!(placeholders(1), "?");
		assert_eq!(placeholders(3), "?, ?, ?");
	}
}
