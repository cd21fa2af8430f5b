use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use sizebot::config::load_size_table;
use sizebot::github::api::{base_github_url, GithubRepositoryClient};
use sizebot::{
    create_app, create_github_client, Config, RepositorySpec, ServerState, SizeTable,
    SizerContext, WebhookSecret,
};

#[derive(clap::Parser)]
struct Opts {
    /// Secret used to authenticate webhooks.
    #[arg(long, env = "GITHUB_SHARED_SECRET")]
    webhook_secret: String,

    /// Owner (`owner`) or repository (`owner/name`) whose pull requests should be sized.
    #[arg(long, env = "GITHUB_REPO_NAME")]
    repository: RepositorySpec,

    /// Token used to access the GitHub API. It needs to be able to create labels.
    #[arg(long, env = "GITHUB_TOKEN")]
    github_token: String,

    /// Base URL of the GitHub API.
    #[arg(long, env = "GITHUB_API_URL", default_value = base_github_url())]
    github_api_url: String,

    /// Port of the webhook server.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// TOML file with size labels and their ranges. The built-in sizes are used if not set.
    #[arg(long, env = "SIZE_CONFIG")]
    size_config: Option<PathBuf>,
}

async fn server(state: ServerState, port: u16) -> anyhow::Result<()> {
    let app = create_app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

fn try_main(opts: Opts) -> anyhow::Result<()> {
    let sizes = match &opts.size_config {
        Some(path) => load_size_table(path)?,
        None => SizeTable::default(),
    };
    tracing::info!("Using size labels {:?}", sizes.labels().collect::<Vec<_>>());

    let config = Arc::new(Config {
        webhook_secret: WebhookSecret::new(opts.webhook_secret),
        repository: opts.repository,
        github_token: SecretString::new(opts.github_token),
        sizes,
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Cannot build tokio runtime")?;

    let client = runtime
        .block_on(async { create_github_client(&config.github_token, &opts.github_api_url) })?;
    let ctx = SizerContext::new(config, Arc::new(GithubRepositoryClient::new(client)));

    runtime.block_on(server(ServerState::new(ctx), opts.port))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sizebot=info,tower_http=info")),
        )
        .init();

    let opts = Opts::parse();
    if let Err(error) = try_main(opts) {
        eprintln!("Error: {error:?}");
        std::process::exit(1);
    }
}
