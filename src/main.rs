use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode};

use blobview::{
    adapters::{azure::AzureContainer, gcs::GcsBucket, s3::S3Bucket, BlobBackend},
    model::{config::ConfigError, path::PathError},
    util::records::render,
    Blobstore, BlobstoreConfig, BlobstoreError, BlobstoreOptions, BlobstoreStatus, ResourcePath,
    ResourcePathType,
};
use clap::{Args, Parser, Subcommand};
use futures::{StreamExt, TryStreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, span, Instrument, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blobview", version, about = "Read-only view over a blob container")]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    /// Chunks buffered ahead of the reader while streaming a blob.
    #[arg(long, global = true)]
    max_queue_size: Option<NonZeroUsize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct BackendArgs {
    /// JSON config for an Azure Blob Storage container.
    #[arg(long)]
    config: Option<PathBuf>,

    /// S3 bucket, credentials taken from the environment.
    #[arg(long)]
    s3: Option<String>,

    /// GCS bucket, credentials taken from the environment.
    #[arg(long)]
    gcs: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Probe the container.
    Status,
    /// List one level under PATH.
    Ls {
        #[arg(default_value = "")]
        path: String,
    },
    /// Exit 0 when PATH is a readable blob.
    Exists { path: String },
    /// Write a blob to stdout.
    Cat {
        path: String,
        /// Decode JSON records and print them in the configured output shape.
        #[arg(long)]
        records: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Blobstore(#[from] BlobstoreError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to authenticate: {0}")]
    Auth(String),

    #[error("status: {0}")]
    Status(BlobstoreStatus),

    #[error("not listable: {0}")]
    NotListable(String),

    #[error("not a resource: {0}")]
    NotResource(String),

    #[error("one of --config, --s3 or --gcs is required")]
    NoBackend,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let span = span!(Level::INFO, "main", context = "main");
    match run(cli).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error_message=%err, error_group="main");
            eprintln!("blobview: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    info!("called");

    if let Some(path) = &cli.backend.config {
        let mut config = BlobstoreConfig::load(path)?;
        if cli.max_queue_size.is_some() {
            config.max_queue_size = cli.max_queue_size;
        }
        info!(config = ?config.sanitize(), "loaded config");

        // `status` reports the probe result itself instead of failing the connect.
        let store = match cli.command {
            Command::Status => Blobstore::new(
                AzureContainer::from_config(&config)?,
                BlobstoreOptions::from(&config),
            ),
            _ => Blobstore::connect(&config).await?,
        };

        return execute(&store, cli.command).await;
    }

    let mut options = BlobstoreOptions::default();
    if let Some(max_queue_size) = cli.max_queue_size {
        options.max_queue_size = max_queue_size;
    }

    if let Some(bucket) = &cli.backend.s3 {
        info!(bucket = %bucket, "using s3");
        let config = aws_config::load_from_env().await;
        let client = S3Bucket::new(aws_sdk_s3::Client::new(&config), bucket);

        return execute(&Blobstore::new(client, options), cli.command).await;
    }

    if let Some(bucket) = &cli.backend.gcs {
        info!(bucket = %bucket, "using gcs");
        let config = google_cloud_storage::client::ClientConfig::default()
            .with_auth()
            .await
            .map_err(|err| CliError::Auth(err.to_string()))?;
        let client = GcsBucket::new(google_cloud_storage::client::Client::new(config), bucket);

        return execute(&Blobstore::new(client, options), cli.command).await;
    }

    Err(CliError::NoBackend)
}

async fn execute<C: BlobBackend + 'static>(
    store: &Blobstore<C>,
    command: Command,
) -> Result<(), CliError> {
    match command {
        Command::Status => {
            let status = store.status().await;
            println!("{}", status);
            if !status.is_ok() {
                return Err(CliError::Status(status));
            }
        }
        Command::Ls { path } => {
            let path = ResourcePath::parse(&path)?;
            let Some(listing) = store.list(&path).await? else {
                return Err(CliError::NotListable(path.to_string()));
            };

            for (name, kind) in listing {
                match kind {
                    ResourcePathType::LeafResource => println!("{}", name),
                    ResourcePathType::Prefix => println!("{}/", name),
                }
            }
        }
        Command::Exists { path } => {
            let path = ResourcePath::parse(&path)?;
            let exists = store.is_resource(&path).await?;
            println!("{}", exists);
            if !exists {
                return Err(CliError::NotResource(path.to_string()));
            }
        }
        Command::Cat { path, records } => {
            let path = ResourcePath::parse(&path)?;

            if records {
                let values: Vec<Value> = store.records(&path)?.try_collect().await?;
                print!("{}", render(&values, store.options().output_shape));
                return Ok(());
            }

            let mut stream = store.get(&path)?;
            let mut stdout = tokio::io::stdout();
            while let Some(chunk) = stream.next().await {
                stdout.write_all(&chunk?).await?;
            }
            stdout.flush().await?;
        }
    }

    Ok(())
}
