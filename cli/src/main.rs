//! `ldprepo` CLI — batch operations against an LDP/Fedora-4-style
//! repository: status checks, single-resource fetch, publish/unpublish,
//! and bulk load/update jobs.

mod config;

use clap::{Parser, Subcommand};
use config::Config;
use ldprepo::resource::{ContentModel, Resource};
use ldprepo::rdf::vocab;
use ldprepo_batch::{BatchConfig, BatchEngine, ItemOutcome, ItemSource};
use ldprepo_client::{AuthConfig, Authenticator, Client, Endpoint, Structure, Transaction};
use ldprepo_publish::{publication_status, publish, unpublish, HandleServiceClient};
use ldprepo_repo::{walk, Repository};
use std::path::PathBuf;
use std::time::Duration;

/// A bare RDF resource with no declared properties, used by commands that
/// operate on arbitrary repository content rather than a specific domain
/// model. Callers embedding these crates in a larger application define
/// their own `ContentModel`s; the CLI only needs to read/write whatever
/// triples a resource already carries.
static GENERIC_RESOURCE: ContentModel =
    ContentModel { properties: &[], default_values: &[], validators: &[], rdf_type: None };

#[derive(Parser)]
#[command(name = "ldprepo", version, about = "Batch client for an LDP/Fedora repository")]
struct Cli {
    /// Path to a YAML configuration file (REPOSITORY/PUBLICATION_WORKFLOW
    /// sections).
    #[arg(long, short = 'c', env = "LDPREPO_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify connectivity to the repository.
    Status,
    /// Fetch a resource's description and print it as N-Triples.
    Get { path: String },
    /// Delete a resource.
    Delete { path: String },
    /// Register a handle for a resource and mark it published.
    Publish {
        path: String,
        /// Public URL to register the handle against. If omitted, it is
        /// derived from `PUBLICATION_WORKFLOW.PUBLIC_URL_PATTERN`.
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        hidden: bool,
        #[arg(long)]
        visible: bool,
    },
    /// Remove the Published access class from a resource.
    Unpublish {
        path: String,
        #[arg(long)]
        hidden: bool,
        #[arg(long)]
        visible: bool,
    },
    /// Print a resource's publication status.
    PublicationStatus { path: String },
    /// Run a batch job over a list of resource paths, persisting each
    /// item's pending changes (if any) back to the repository.
    Load {
        /// A file with one resource path per line, or `-` for stdin.
        #[arg(long)]
        batch: Option<PathBuf>,
        /// Explicit list of resource paths (alternative to `--batch`).
        paths: Vec<String>,
        #[arg(long)]
        completed_log: PathBuf,
        #[arg(long)]
        skip_log: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        percent: Option<f64>,
        #[arg(long)]
        wait: Option<u64>,
        #[arg(long)]
        dry_run: bool,
        /// Overrides the repository's configured transaction keep-alive
        /// interval (seconds) for this job's per-item transactions.
        #[arg(long)]
        keep_alive_interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(CliError::Interrupted) => 2,
        Err(error) => {
            tracing::error!(%error, "command failed");
            1
        }
    };
    std::process::exit(exit_code);
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Client(#[from] ldprepo_client::ClientError),
    #[error(transparent)]
    Repository(#[from] ldprepo_repo::RepositoryError),
    #[error(transparent)]
    Batch(#[from] ldprepo_batch::BatchError),
    #[error(transparent)]
    Publish(#[from] ldprepo_publish::PublishError),
    #[error("interrupted")]
    Interrupted,
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::load(&cli.config)?;
    let repo = build_repository(&config)?;

    match cli.command {
        Commands::Status => {
            repo.client().test_connection().await?;
            println!("OK: connected to {}", repo.client().endpoint().url);
            Ok(())
        }
        Commands::Get { path } => {
            let mut handle = repo.resource(&path);
            let resource = handle.describe(&GENERIC_RESOURCE).await?;
            print_graph(resource);
            Ok(())
        }
        Commands::Delete { path } => {
            let root = repo.resource(&path).uri().to_string();
            let ldp_contains = vocab::ldp_contains();
            let pcdm_has_member = vocab::pcdm_has_member();
            let traverse = [ldp_contains.as_str(), pcdm_has_member.as_str()];
            let mut entries = walk(&repo, &root, &traverse, false, 0, None).await;
            // Deepest resources first, so a container is only removed once
            // everything it contains/has as a member has already gone.
            entries.sort_by(|a, b| b.depth().cmp(&a.depth()));

            let client = repo.client().clone();
            let interval = repo.keep_alive_interval();
            let repo_for_txn = repo.clone();
            let deleted = entries.len();
            Transaction::scope(client, interval, |txn| async move {
                for entry in &entries {
                    repo_for_txn.resource(entry.uri()).delete_via(&txn).await?;
                }
                Ok(())
            })
            .await?;
            println!("Deleted {deleted} resource(s) under {root}");
            Ok(())
        }
        Commands::Publish { path, url, hidden, visible } => {
            let Some(workflow_config) = &config.publication_workflow else {
                eprintln!("PUBLICATION_WORKFLOW is not configured");
                return Err(CliError::Interrupted);
            };
            let handle_client = HandleServiceClient::new(
                workflow_config.handle_service_url.clone(),
                reqwest::Client::new(),
                workflow_config.handle_service_token.clone(),
            );
            let mut handle = repo.resource(&path);
            let resource = handle.describe(&GENERIC_RESOURCE).await?.clone();
            let repo_id = resource.uri().to_string();
            let url = match url {
                Some(url) => url,
                None => ldprepo_publish::build_public_url(
                    &workflow_config.public_url_pattern,
                    repo.client().endpoint(),
                    &resource,
                )?,
            };
            let info = publish(
                &resource,
                &handle_client,
                &repo_id,
                &workflow_config.handle_repo,
                &url,
                hidden,
                visible,
            )
            .await?;
            println!("Published {repo_id} as {}", info.hdl_uri());
            handle.update().await?;
            Ok(())
        }
        Commands::Unpublish { path, hidden, visible } => {
            let mut handle = repo.resource(&path);
            let resource = handle.describe(&GENERIC_RESOURCE).await?.clone();
            unpublish(&resource, hidden, visible);
            handle.update().await?;
            println!("Unpublished {path}");
            Ok(())
        }
        Commands::PublicationStatus { path } => {
            let mut handle = repo.resource(&path);
            let resource = handle.describe(&GENERIC_RESOURCE).await?;
            println!("{:?}", publication_status(resource));
            Ok(())
        }
        Commands::Load {
            batch,
            paths,
            completed_log,
            skip_log,
            limit,
            percent,
            wait,
            dry_run,
            keep_alive_interval,
        } => {
            run_load(
                &repo,
                batch,
                paths,
                completed_log,
                skip_log,
                limit,
                percent,
                wait,
                dry_run,
                keep_alive_interval,
            )
            .await
        }
    }
}

fn build_repository(config: &Config) -> Result<Repository, CliError> {
    let repo_config = &config.repository;
    let endpoint = Endpoint::new(
        &repo_config.rest_endpoint,
        &repo_config.relpath,
        repo_config.external_url.as_deref(),
    )?;

    let structure = match repo_config.structure.as_str() {
        "hierarchical" => Structure::Hierarchical,
        _ => Structure::Flat,
    };

    let auth_config = AuthConfig {
        auth_token: repo_config.auth_token.clone(),
        jwt_secret: repo_config.jwt_secret.clone(),
        jwt_subject: repo_config.jwt_subject.clone(),
        client_cert: repo_config.client_cert.clone(),
        client_key: repo_config.client_key.clone(),
        fedora_user: repo_config.fedora_user.clone(),
        fedora_password: repo_config.fedora_password.clone(),
    };
    let authenticator = Authenticator::from_config(&auth_config)?;

    let mut client = Client::new(endpoint, reqwest::Client::new(), structure);
    if let Some(authenticator) = authenticator {
        client = client.with_authenticator(authenticator);
    }

    Ok(Repository::new(client)
        .with_keep_alive_interval(Duration::from_secs(repo_config.keep_alive_interval_secs)))
}

fn print_graph(resource: &Resource) {
    for triple in resource.graph().borrow().iter() {
        println!("{triple}");
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_load(
    repo: &Repository,
    batch: Option<PathBuf>,
    paths: Vec<String>,
    completed_log: PathBuf,
    skip_log: PathBuf,
    limit: Option<usize>,
    percent: Option<f64>,
    wait: Option<u64>,
    dry_run: bool,
    keep_alive_interval: Option<u64>,
) -> Result<(), CliError> {
    let source = match batch {
        Some(path) if path.as_os_str() == "-" => ItemSource::Stdin,
        Some(path) => ItemSource::File(path),
        None => ItemSource::List(paths),
    };

    let completed_log = ldprepo_batch::ItemLog::open(
        &completed_log,
        ["number", "path", "timestamp", "title", "uri"],
        "path",
    )
    .map_err(ldprepo_batch::BatchError::Log)?;
    let skip_log = ldprepo_batch::ItemLog::open(
        &skip_log,
        ["number", "path", "timestamp", "reason"],
        "path",
    )
    .map_err(ldprepo_batch::BatchError::Log)?;

    let keep_alive_interval = keep_alive_interval.map(Duration::from_secs);
    let engine = BatchEngine::new(
        source,
        completed_log,
        skip_log,
        None,
        BatchConfig { limit, percent, wait: wait.map(Duration::from_secs), dry_run, keep_alive_interval },
    );

    let repo = match keep_alive_interval {
        Some(interval) => repo.clone().with_keep_alive_interval(interval),
        None => repo.clone(),
    };
    let summary = engine
        .run(|_index, path| {
            let repo = repo.clone();
            async move {
                let mut handle = repo.resource(&path);
                let resource = handle
                    .describe(&GENERIC_RESOURCE)
                    .await
                    .map_err(ldprepo_batch::BatchError::Repository)?;
                let uri = resource.uri().to_string();
                handle.update().await.map_err(ldprepo_batch::BatchError::Repository)?;
                Ok(ItemOutcome::Completed { uri, title: path })
            }
        })
        .await?;

    println!(
        "completed={} skipped={} dropped={} failed={} interrupted={}",
        summary.completed, summary.skipped, summary.dropped, summary.failed, summary.interrupted
    );

    if summary.interrupted {
        return Err(CliError::Interrupted);
    }
    Ok(())
}
