use clap::Args;
use jiff::SignedDuration;
use storefront_app::domain::sessions::{PgSessionStore, SessionStore};

#[derive(Debug, Args)]
pub(crate) struct PurgeSessionsArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: PurgeSessionsArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database_url).await?;

    // Purging never writes an expiry, so the TTL is irrelevant here.
    let purged = PgSessionStore::new(db, SignedDuration::ZERO)
        .purge_expired()
        .await
        .map_err(|error| format!("failed to purge sessions: {error}"))?;

    println!("purged_sessions: {purged}");

    Ok(())
}
