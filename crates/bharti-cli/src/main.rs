//! `bharti` — conversational backend for the Indian Culture Portal.

use bharti_chat::{
    ContextResolver, ConversationOrchestrator, LlmIntentClassifier, LlmTranslator,
    ResponseGenerator,
};
use bharti_gateway::GatewayServer;
use bharti_llm::{LlmClient, ModelConfig};
use bharti_retrieval::{
    CatalogStore, EmbeddingProvider, InMemoryVectorStore, LocalEmbedding, RemoteEmbedding,
    SqliteCatalog, TitleIndex,
};
use bharti_session::InMemorySessionStore;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bharti", about = "Bharti — Indian Culture Portal chat backend")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "bharti.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat gateway server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Embed every catalog title and report the index size (dry run of the
    /// ingestion the server performs at boot)
    Index,
}

#[derive(Deserialize)]
struct BhartiConfig {
    model: ModelConfig,
    #[serde(default = "default_catalog_path")]
    catalog_path: PathBuf,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    embedding: EmbeddingConfig,
    #[serde(default)]
    retrieval: RetrievalConfig,
}

#[derive(Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "lowercase", tag = "provider")]
enum EmbeddingConfig {
    /// Hashed bag-of-words, no external API.
    #[default]
    Local,
    /// OpenAI embeddings API.
    OpenAi {
        api_key: String,
    },
}

#[derive(Deserialize)]
struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default = "default_threshold")]
    threshold: f32,
    #[serde(default = "default_max_context_words")]
    max_context_words: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            threshold: default_threshold(),
            max_context_words: default_max_context_words(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("./all_categories_data.db")
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_top_k() -> usize {
    10
}
fn default_threshold() -> f32 {
    0.40
}
fn default_max_context_words() -> usize {
    400
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let config_str = tokio::fs::read_to_string(&cli.config).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            cli.config.display(),
            e
        )
    })?;
    let config: BhartiConfig = toml::from_str(&config_str)?;

    let catalog: Arc<dyn CatalogStore> = Arc::new(SqliteCatalog::open(&config.catalog_path)?);
    let embedder: Arc<dyn EmbeddingProvider> = match &config.embedding {
        EmbeddingConfig::Local => Arc::new(LocalEmbedding::default()),
        EmbeddingConfig::OpenAi { api_key } => Arc::new(RemoteEmbedding::new(api_key.clone())),
    };
    let index = TitleIndex::new(embedder, Arc::new(InMemoryVectorStore::new()))
        .with_top_k(config.retrieval.top_k)
        .with_threshold(config.retrieval.threshold);

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            let indexed = index.index_catalog(catalog.as_ref()).await?;
            info!(indexed, "Catalog titles embedded");

            let llm = Arc::new(LlmClient::new(config.model));
            let resolver = ContextResolver::new(Arc::new(index), catalog)
                .with_max_context_words(config.retrieval.max_context_words);
            let generator =
                ResponseGenerator::new(llm.clone(), Arc::new(LlmTranslator::new(llm.clone())));
            let orchestrator = Arc::new(ConversationOrchestrator::new(
                Arc::new(LlmIntentClassifier::new(llm)),
                resolver,
                generator,
                Arc::new(InMemorySessionStore::new()),
            ));

            let app = GatewayServer::build(orchestrator);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("Bharti gateway listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Index => {
            let indexed = index.index_catalog(catalog.as_ref()).await?;
            println!("Indexed {indexed} catalog title(s)");
        }
    }

    Ok(())
}
