use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gymdb::storage::dynamodb::{table, DynamoDbStore};
use gymdb::{Config, Repositories};
use gymdb_core::models::{current_iat, Exercise, WorkoutPayload};

/// gymdb - Manage gym users and their workouts in a single DynamoDB table
#[derive(Parser, Debug)]
#[command(name = "gymdb")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Table holding every entity
    #[arg(long, global = true, env = "GYM_TABLE_NAME")]
    table_name: Option<String>,

    /// Custom DynamoDB endpoint, e.g. http://localhost:8000
    #[arg(long, global = true, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or delete the table
    #[command(subcommand)]
    Table(TableCommand),

    /// Read user records
    #[command(subcommand)]
    User(UserCommand),

    /// Manage a user's workouts
    #[command(subcommand)]
    Workouts(WorkoutsCommand),
}

#[derive(Subcommand, Debug)]
enum TableCommand {
    /// Create the table and wait until it is active
    Create,
    /// Delete the table
    Delete,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Print a user's public profile
    Show { username: String },
    /// Print a user's profile together with their workouts
    Profile { username: String },
    /// Append a login to a user's history
    RecordLogin { username: String, ip: String },
}

#[derive(Subcommand, Debug)]
enum WorkoutsCommand {
    /// List a user's workouts
    List { username: String },
    /// Create a workout from a JSON file
    Create {
        username: String,
        name: String,
        /// JSON file with `description` and `exercises`
        #[arg(long, short)]
        file: PathBuf,
    },
    /// Replace a workout, renaming it when NEW differs from OLD
    Edit {
        username: String,
        old: String,
        new: String,
        /// JSON file with `description` and `exercises`
        #[arg(long, short)]
        file: PathBuf,
    },
    /// Delete a workout
    Delete { username: String, name: String },
}

/// Workout contents as read from a file. The timestamp is set on write.
#[derive(Debug, Deserialize)]
struct WorkoutInput {
    #[serde(default)]
    description: String,
    exercises: Vec<Exercise>,
}

fn read_payload(path: &Path) -> Result<WorkoutPayload> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: WorkoutInput = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid workout file {}", path.display()))?;

    Ok(WorkoutPayload::new(
        input.description,
        input.exercises,
        current_iat(),
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymdb=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();
    if let Some(table_name) = cli.table_name {
        config.table_name = table_name;
    }
    if let Some(endpoint_url) = cli.endpoint_url {
        config.endpoint_url = Some(endpoint_url);
    }

    tracing::info!("Target: {}", config.target_display());

    let store = DynamoDbStore::from_config(&config).await;

    match cli.command {
        Command::Table(action) => run_table(action, &store).await,
        Command::User(action) => {
            let repos = Repositories::new(Arc::new(store), &config);
            run_user(action, &repos).await
        }
        Command::Workouts(action) => {
            let repos = Repositories::new(Arc::new(store), &config);
            run_workouts(action, &repos).await
        }
    }
}

async fn run_table(action: TableCommand, store: &DynamoDbStore) -> Result<()> {
    match action {
        TableCommand::Create => {
            let outcome = table::ensure_table(store.client(), store.table_name()).await?;
            println!("{:?}", outcome);
        }
        TableCommand::Delete => {
            let outcome = table::drop_table(store.client(), store.table_name()).await?;
            println!("{:?}", outcome);
        }
    }
    Ok(())
}

async fn run_user(action: UserCommand, repos: &Repositories<DynamoDbStore>) -> Result<()> {
    match action {
        UserCommand::Show { username } => {
            let metadata = repos.profiles.get_metadata(&username).await?;
            print_json(&metadata.profile())
        }
        UserCommand::Profile { username } => {
            let (metadata, workouts) = repos.profiles.get_profile_and_workouts(&username).await?;
            print_json(&serde_json::json!({
                "user": metadata.profile(),
                "workouts": workouts,
            }))
        }
        UserCommand::RecordLogin { username, ip } => {
            repos
                .registrar
                .record_login(&username, &ip, current_iat())
                .await?;
            Ok(())
        }
    }
}

async fn run_workouts(action: WorkoutsCommand, repos: &Repositories<DynamoDbStore>) -> Result<()> {
    match action {
        WorkoutsCommand::List { username } => {
            print_json(&repos.workouts.list(&username).await?)
        }
        WorkoutsCommand::Create {
            username,
            name,
            file,
        } => {
            let payload = read_payload(&file)?;
            repos.workouts.create(&username, &name, &payload).await?;
            Ok(())
        }
        WorkoutsCommand::Edit {
            username,
            old,
            new,
            file,
        } => {
            let payload = read_payload(&file)?;
            repos.workouts.edit(&username, &old, &new, &payload).await?;
            Ok(())
        }
        WorkoutsCommand::Delete { username, name } => {
            repos.workouts.delete(&username, &name).await?;
            Ok(())
        }
    }
}
