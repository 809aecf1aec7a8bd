use clap::Parser;
use dayplan::cli::{run_menu, run_notes, run_pomodoro, run_stats, run_tasks, run_user, App, Cli, Commands};
use dayplan::config::{resolve_db_path, Config, ENV_LOG};
use dayplan::db::Database;
use dayplan::store::SqliteStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let db = Database::open_at(resolve_db_path(cli.db.clone())?)?;

    // Works before any user is configured
    if let Some(Commands::User(args)) = &cli.command {
        return run_user(&db, args.name.as_deref());
    }

    let config = Config::load(&db, cli.user.as_deref())?;
    tracing::debug!(user = %config.user_name, path = ?db.path(), "starting");
    let mut app = App::new(SqliteStore::new(db), config);

    match cli.command {
        None => run_menu(&mut app).await?,
        Some(Commands::Notes(args)) => run_notes(&app, args).await?,
        Some(Commands::Tasks(args)) => run_tasks(&app, args).await?,
        Some(Commands::Pomodoro(args)) => run_pomodoro(&app, args).await?,
        Some(Commands::Stats) => run_stats(&app).await?,
        Some(Commands::User(_)) => {}
    }

    Ok(())
}
