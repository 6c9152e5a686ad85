// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project automation
//!
//! `cargo xtask <command>` wraps the checks CI runs, plus one check that
//! needs the database layer:
//!
//! - `verify-migrations` applies the embedded `SQLite` migrations to a
//!   scratch database, checks the constraints the marketplace relies on,
//!   then reverts everything and checks the schema is empty again.
//!
//! Nothing here needs external services. `cargo test` stays fast and
//! self-contained.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    eyre::{bail, eyre, Context},
    Result,
};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables the services read and write.
const EXPECTED_TABLES: &[&str] = &[
    "booking_check_ins",
    "booking_status_history",
    "bookings",
    "invoice_line_items",
    "invoice_status_history",
    "invoices",
    "participants",
    "payment_refunds",
    "payments",
    "provider_payouts",
    "provider_services",
    "providers",
    "users",
];

/// Uniqueness the services depend on for correctness, as `(table, columns)`.
const REQUIRED_UNIQUE: &[(&str, &[&str])] = &[
    ("users", &["email"]),
    ("participants", &["user_id"]),
    ("providers", &["user_id"]),
    ("bookings", &["booking_number"]),
    ("invoices", &["provider_id", "invoice_number"]),
    ("invoice_line_items", &["booking_id"]),
    ("invoice_line_items", &["invoice_id", "line_number"]),
];

/// Columns whose storage type matters, as `(table, column, type)`.
///
/// Money is stored as decimal text so no amount passes through a float.
const REQUIRED_COLUMNS: &[(&str, &str, &str)] = &[
    ("bookings", "version", "integer"),
    ("bookings", "quoted_rate", "text"),
    ("bookings", "estimated_total", "text"),
    ("invoices", "subtotal", "text"),
    ("invoices", "total_amount", "text"),
    ("invoices", "provider_payout", "text"),
    ("invoice_line_items", "line_total", "text"),
    ("payments", "amount", "text"),
    ("provider_payouts", "amount", "text"),
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Lint formatting, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Apply and revert the `SQLite` migrations and check the schema
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, migrations)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Lint clippy, docs, and formatting
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without warnings for every default workspace member
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            ["doc", "--no-deps", "--all-features", "--package", &package.name],
        )
        .env("RUSTDOCFLAGS", "-D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all"])
}

/// Run every workspace test, including doc tests
fn test() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])?;
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Apply every migration to an in-memory database, check the resulting
/// schema, then revert and check nothing is left behind.
///
/// ## Checks
///
/// - Every table the services use exists
/// - Every uniqueness constraint the services rely on exists
/// - Every foreign key points at an existing table and column
/// - `PRAGMA foreign_key_check` reports no violations
/// - Reverting all migrations leaves no application tables
fn verify_migrations() -> Result<()> {
    tracing::info!("Applying migrations to a scratch database");
    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;

    tracing::info!("Introspecting schema");
    let schema = introspect_sqlite_schema(&mut conn)?;

    check_tables(&schema)?;
    check_columns(&schema)?;
    check_unique_constraints(&schema)?;
    check_foreign_keys(&schema)?;
    check_foreign_key_integrity(&mut conn)?;

    tracing::info!("Reverting migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;
    let reverted = introspect_sqlite_schema(&mut conn)?;
    if !reverted.tables.is_empty() {
        let left: Vec<&String> = reverted.tables.keys().collect();
        bail!("Tables left after reverting migrations: {left:?}");
    }

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

fn check_tables(schema: &Schema) -> Result<()> {
    let missing: Vec<&str> = EXPECTED_TABLES
        .iter()
        .copied()
        .filter(|name| !schema.tables.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        bail!("Missing tables: {missing:?}");
    }
    let extra: Vec<&String> = schema
        .tables
        .keys()
        .filter(|name| !EXPECTED_TABLES.contains(&name.as_str()))
        .collect();
    if !extra.is_empty() {
        tracing::warn!("Tables not used by any service: {extra:?}");
    }
    Ok(())
}

fn check_columns(schema: &Schema) -> Result<()> {
    for (table, column, expected) in REQUIRED_COLUMNS {
        let Some(found) = schema.tables.get(*table).and_then(|t| t.columns.get(*column)) else {
            bail!("Missing column {table}.{column}");
        };
        if found.normalized_type != *expected || found.nullable {
            bail!(
                "{table}.{column} is {} (nullable: {}), expected NOT NULL {expected}",
                found.normalized_type,
                found.nullable
            );
        }
    }
    Ok(())
}

fn check_unique_constraints(schema: &Schema) -> Result<()> {
    for (table, columns) in REQUIRED_UNIQUE {
        let wanted: Vec<String> = columns.iter().map(ToString::to_string).collect();
        let found = schema
            .tables
            .get(*table)
            .is_some_and(|t| t.unique_constraints.contains(&UniqueConstraint { columns: wanted }));
        if !found {
            bail!("Missing UNIQUE ({}) on table {table}", columns.join(", "));
        }
        tracing::debug!("UNIQUE ({}) on {table}", columns.join(", "));
    }
    Ok(())
}

fn check_foreign_keys(schema: &Schema) -> Result<()> {
    for (table_name, table) in &schema.tables {
        for fk in &table.foreign_keys {
            let Some(target) = schema.tables.get(&fk.to_table) else {
                bail!(
                    "{table_name}.{} references missing table {}",
                    fk.from_column,
                    fk.to_table
                );
            };
            if !target.columns.contains_key(&fk.to_column) {
                bail!(
                    "{table_name}.{} references missing column {}.{}",
                    fk.from_column,
                    fk.to_table,
                    fk.to_column
                );
            }
            if !table.columns.contains_key(&fk.from_column) {
                bail!("{table_name} has a foreign key on unknown column {}", fk.from_column);
            }
        }
    }
    Ok(())
}

fn check_foreign_key_integrity(conn: &mut SqliteConnection) -> Result<()> {
    #[derive(QueryableByName)]
    struct Violation {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        parent: String,
    }

    let violations: Vec<Violation> = diesel::sql_query("PRAGMA foreign_key_check")
        .load(conn)
        .wrap_err("Failed to run foreign key check")?;
    if let Some(first) = violations.first() {
        bail!(
            "{} foreign key violation(s), first in {} -> {}",
            violations.len(),
            first.table,
            first.parent
        );
    }
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        unique: i32,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            foreign_keys: BTreeSet::new(),
            unique_constraints: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            table_info.columns.insert(
                col.name,
                Column {
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    nullable: col.notnull == 0,
                },
            );
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        // Column-level UNIQUE, table-level UNIQUE and CREATE UNIQUE INDEX all
        // enforce the same thing, so any unique index counts.
        for idx in indexes.into_iter().filter(|idx| idx.unique != 0) {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            table_info.unique_constraints.insert(UniqueConstraint {
                columns: index_columns.into_iter().map(|c| c.name).collect(),
            });
        }

        tracing::debug!(
            "{}: {} columns, {} foreign keys",
            table.name,
            table_info.columns.len(),
            table_info.foreign_keys.len()
        );
        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string()
    }
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
