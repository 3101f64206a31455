use clap::Parser;
use db::DBService;
use services::services::seed;
use tracing_subscriber::EnvFilter;

/// Seed the quest catalog into the database (idempotent).
#[derive(Parser, Debug)]
#[command(name = "seed_quests")]
struct Args {
    /// Seed rows as inactive (is_active = false)
    #[arg(long)]
    inactive: bool,

    /// Database to seed
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://fitquest.db")]
    database_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let db = DBService::new(&args.database_url).await?;

    let summary = seed::upsert_quests(&db.pool, !args.inactive).await?;

    println!(
        "seed_quests done: created={} updated={} total={}",
        summary.created, summary.updated, summary.total
    );
    Ok(())
}
