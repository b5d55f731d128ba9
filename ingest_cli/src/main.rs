use anyhow::Context;
use clap::Parser;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::{path::PathBuf, str::FromStr};
use tracing::{debug, info};

/// Ingest music source JSON into PostgreSQL.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
struct Args {
    /// Path to the input JSON file
    #[arg(long)]
    json: PathBuf,
    /// Roll everything back after ingesting instead of committing
    #[arg(long)]
    dry_run: bool,
    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(Debug, Clone, clap::Args)]
struct ConnectionArgs {
    #[arg(long, env = "PGHOST", default_value = "localhost")]
    host: String,
    #[arg(long, env = "PGPORT", default_value_t = 5432)]
    port: u16,
    #[arg(long, env = "PGUSER", default_value = "VMusicPlayer")]
    user: String,
    #[arg(long, env = "PGPASSWORD", default_value = "VMusicPlayer", hide_env_values = true)]
    password: String,
    #[arg(long, env = "PGDATABASE", default_value = "VMusicPlayer")]
    dbname: String,
    /// disable, allow, prefer, require, verify-ca or verify-full
    #[arg(long, env = "PGSSLMODE")]
    sslmode: Option<String>,
    /// Full connection url, takes precedence over the individual options
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
}

impl ConnectionArgs {
    fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.database_url {
            return PgConnectOptions::from_str(url).context("invalid database url");
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.dbname);
        if let Some(sslmode) = &self.sslmode {
            let mode = PgSslMode::from_str(sslmode)
                .with_context(|| format!("invalid sslmode {sslmode:?}"))?;
            options = options.ssl_mode(mode);
        }

        Ok(options)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    {
        use tracing_subscriber::prelude::*;

        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .init()
    }

    let args = Args::parse();
    debug!(json = %args.json.display(), dry_run = args.dry_run, "parsed arguments");

    let options = args.connection.connect_options()?;
    let database = database::Database::connect_with(options)
        .await
        .context("failed to connect to database")?;

    let start = std::time::Instant::now();
    let report = ingest::ingest_file(
        &database,
        &args.json,
        &ingest::IngestOptions {
            dry_run: args.dry_run,
        },
    )
    .await
    .with_context(|| format!("failed to ingest {}", args.json.display()))?;
    let elapsed = start.elapsed();
    info!(?elapsed, %report, "completed ingest");

    if args.dry_run {
        println!("Dry run completed, no changes were committed.");
    } else {
        println!("Ingest completed successfully.");
    }

    Ok(())
}
