// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! - `cargo xtask ci` runs lint, dependency checks, build and tests
//! - `cargo xtask verify-migrations` applies the `SQLite` migrations to an
//!   in-memory database, checks the resulting schema against the tables the
//!   persistence layer queries, then reverts every migration
//!
//! Standard `cargo test` needs no external services; everything here runs
//! against the local toolchain and an in-memory `SQLite` database.

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
use color_eyre::{Result, eyre::Context};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

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

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    // Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, docs and markdown
    #[command(visible_alias = "l")]
    Lint,

    /// Run lib and doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Apply, inspect and revert the `SQLite` migrations
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::Lint => lint(),
            Self::Test => test(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, migrations)
fn ci() -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Lint formatting, typos, clippy, and docs (and a soft fail on markdown)
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    if let Err(err) = lint_markdown() {
        tracing::warn!("markdownlint reported issues: {err}");
    }
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

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Lint markdown files using [markdownlint-cli2](https://github.com/DavidAnson/markdownlint-cli2)
fn lint_markdown() -> Result<()> {
    cmd!("markdownlint-cli2", "**/*.md", "!target", "!**/target", "!examples").run_with_trace()?;
    Ok(())
}

/// Check for typos in the project using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Run every test target, then the doc tests
fn test() -> Result<()> {
    run_cargo(vec!["test", "--workspace", "--all-targets"])?;
    run_cargo(vec!["test", "--workspace", "--doc"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Tables and columns the persistence layer reads and writes.
///
/// Extra columns are tolerated; a missing one fails verification.
const EXPECTED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "records",
        &[
            "record_id",
            "entity_type",
            "data_json",
            "created_date",
            "updated_date",
        ],
    ),
    ("users", &["user_id", "email", "full_name", "password_hash"]),
    (
        "sessions",
        &[
            "session_id",
            "session_token",
            "user_id",
            "last_activity_at",
            "expires_at",
        ],
    ),
];

/// Verify the `SQLite` migrations
///
/// 1. Applies every migration to an in-memory database with foreign keys on
/// 2. Checks each expected table and column exists and that `sessions`
///    references `users`
/// 3. Reverts every migration and checks no application table is left
///
/// Step 3 catches a `down.sql` that forgets to drop what its `up.sql` made.
fn verify_migrations() -> Result<()> {
    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    tracing::info!("Applying SQLite migrations");
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply SQLite migrations: {}", e))?;
    tracing::info!("{} migrations applied", applied.len());

    let schema = introspect_schema(&mut conn)?;
    check_expected_schema(&schema)?;

    let references_users: bool = schema
        .get("sessions")
        .is_some_and(|table| table.foreign_keys.contains("users"));
    if !references_users {
        return Err(color_eyre::eyre::eyre!(
            "Schema check FAILED: sessions has no foreign key to users"
        ));
    }

    tracing::info!("Reverting SQLite migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to revert SQLite migrations: {}", e))?;

    let leftover = introspect_schema(&mut conn)?;
    if !leftover.is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "Schema check FAILED: tables left after reverting every migration: {:?}",
            leftover.keys().collect::<Vec<_>>()
        ));
    }

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    /// Tables this one references.
    foreign_keys: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    declared_type: String,
    nullable: bool,
}

fn introspect_schema(conn: &mut SqliteConnection) -> Result<BTreeMap<String, Table>> {
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
        #[diesel(column_name = "type")]
        declared_type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        #[diesel(column_name = "table")]
        referenced_table: String,
    }

    let names: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
    )
    .load(conn)
    .wrap_err("Failed to list SQLite tables")?;

    let mut schema: BTreeMap<String, Table> = BTreeMap::new();
    for table in names {
        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err_with(|| format!("Failed to read columns of {}", table.name))?;
        let foreign_keys: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err_with(|| format!("Failed to read foreign keys of {}", table.name))?;

        schema.insert(
            table.name,
            Table {
                columns: columns
                    .into_iter()
                    .map(|c| {
                        (
                            c.name,
                            Column {
                                declared_type: c.declared_type.to_uppercase(),
                                nullable: c.notnull == 0,
                            },
                        )
                    })
                    .collect(),
                foreign_keys: foreign_keys
                    .into_iter()
                    .map(|fk| fk.referenced_table)
                    .collect(),
            },
        );
    }

    Ok(schema)
}

fn check_expected_schema(schema: &BTreeMap<String, Table>) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    for (table_name, columns) in EXPECTED_SCHEMA {
        let Some(table) = schema.get(*table_name) else {
            errors.push(format!("    - Table '{table_name}' is missing"));
            continue;
        };

        for column_name in *columns {
            match table.columns.get(*column_name) {
                None => errors.push(format!(
                    "    - Column '{table_name}.{column_name}' is missing"
                )),
                Some(column) if column.nullable => errors.push(format!(
                    "    - Column '{table_name}.{column_name}' ({}) is nullable",
                    column.declared_type
                )),
                Some(_) => {}
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(color_eyre::eyre::eyre!(
            "Schema check FAILED:\n{}",
            errors.join("\n")
        ))
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
