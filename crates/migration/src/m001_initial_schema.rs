use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_initial_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let statements = match manager.get_database_backend() {
            DatabaseBackend::Sqlite => SQLITE_UP,
            DatabaseBackend::Postgres => POSTGRES_UP,
            DatabaseBackend::MySql => MYSQL_UP,
        };
        // One statement per call; the MySQL driver rejects multi-statement strings.
        for sql in statements {
            manager.get_connection().execute_unprepared(sql).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for sql in DOWN {
            manager.get_connection().execute_unprepared(sql).await?;
        }
        Ok(())
    }
}

// `analyses` is written by the detector; creating it here keeps a fresh
// database usable before the detector has run once.
const SQLITE_UP: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS rules (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        expression TEXT NOT NULL,
        subhealth_condition_type TEXT,
        subhealth_threshold REAL,
        fault_condition_type TEXT,
        fault_threshold REAL,
        severity TEXT NOT NULL,
        duration TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS analyses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        rule_id INTEGER NOT NULL,
        rule_name TEXT NOT NULL,
        status TEXT NOT NULL,
        count INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_analyses_rule_name ON analyses(rule_name)",
];

const POSTGRES_UP: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS rules (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(64) NOT NULL UNIQUE,
        expression VARCHAR(512) NOT NULL,
        subhealth_condition_type VARCHAR(32),
        subhealth_threshold DOUBLE PRECISION,
        fault_condition_type VARCHAR(32),
        fault_threshold DOUBLE PRECISION,
        severity VARCHAR(16) NOT NULL,
        duration VARCHAR(32) NOT NULL,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS analyses (
        id BIGSERIAL PRIMARY KEY,
        rule_id BIGINT NOT NULL,
        rule_name VARCHAR(64) NOT NULL,
        status VARCHAR(32) NOT NULL,
        count BIGINT NOT NULL DEFAULT 0,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_analyses_rule_name ON analyses(rule_name)",
];

const MYSQL_UP: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS rules (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(64) NOT NULL UNIQUE,
        expression VARCHAR(512) NOT NULL,
        subhealth_condition_type VARCHAR(32),
        subhealth_threshold DOUBLE,
        fault_condition_type VARCHAR(32),
        fault_threshold DOUBLE,
        severity VARCHAR(16) NOT NULL,
        duration VARCHAR(32) NOT NULL,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS analyses (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        rule_id BIGINT NOT NULL,
        rule_name VARCHAR(64) NOT NULL,
        status VARCHAR(32) NOT NULL,
        count BIGINT NOT NULL DEFAULT 0,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL,
        INDEX idx_analyses_rule_name (rule_name)
    )",
];

const DOWN: &[&str] = &["DROP TABLE IF EXISTS analyses", "DROP TABLE IF EXISTS rules"];
