use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Row};

use crate::domain::order::OrderError;

// ============================================================================
// SQL Dialect Strategy
// ============================================================================
//
// One variant per supported backend, chosen once at startup from the
// connection URL and carried by the Database handle. All queries share a
// single text with $N placeholders (valid in both PostgreSQL and SQLite);
// the dialect only answers the questions where the backends genuinely
// differ: DDL fragments and boolean encoding.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    /// Resolve the dialect from a connection URL scheme. An unknown scheme
    /// is a configuration error and fails here, before any I/O happens.
    pub fn from_url(url: &str) -> Result<Self, OrderError> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            "sqlite" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            _ => Err(OrderError::UnsupportedBackend(url.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
        }
    }

    /// Column definition for a store-assigned autoincrementing primary key.
    pub fn autoincrement_pk(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
            Dialect::Postgres => "BIGSERIAL PRIMARY KEY",
        }
    }

    /// Column type for timestamps, persisted as epoch seconds.
    pub fn timestamp_type(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "INTEGER",
            Dialect::Postgres => "BIGINT",
        }
    }

    /// DDL default expression producing the current epoch-second timestamp.
    pub fn current_timestamp_default(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "(strftime('%s', 'now'))",
            Dialect::Postgres => "(extract(epoch from now())::bigint)",
        }
    }

    /// Column type for booleans. SQLite has no native boolean and stores
    /// 0/1 integers.
    pub fn boolean_type(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "INTEGER",
            Dialect::Postgres => "BOOLEAN",
        }
    }

    /// Literal for a boolean default clause in DDL.
    pub fn boolean_literal(&self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::Sqlite, false) => "0",
            (Dialect::Sqlite, true) => "1",
            (Dialect::Postgres, false) => "FALSE",
            (Dialect::Postgres, true) => "TRUE",
        }
    }

    /// Column definition for an enumerated value restricted to `allowed`.
    pub fn enum_column(&self, name: &str, allowed: &[&str]) -> String {
        let column_type = match self {
            Dialect::Sqlite => "TEXT",
            Dialect::Postgres => "VARCHAR(32)",
        };
        let list = allowed
            .iter()
            .map(|v| format!("'{v}'"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{name} {column_type} NOT NULL CHECK ({name} IN ({list}))")
    }

    /// Bind a boolean with the encoding this backend expects on write.
    pub fn bind_bool<'q>(
        &self,
        query: Query<'q, Any, AnyArguments<'q>>,
        value: bool,
    ) -> Query<'q, Any, AnyArguments<'q>> {
        match self {
            Dialect::Sqlite => query.bind(value as i64),
            Dialect::Postgres => query.bind(value),
        }
    }

    /// Read a boolean column back with the matching decoding rule.
    pub fn read_bool(&self, row: &AnyRow, column: &str) -> Result<bool, sqlx::Error> {
        match self {
            Dialect::Sqlite => Ok(row.try_get::<i64, _>(column)? != 0),
            Dialect::Postgres => row.try_get(column),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
