use anyhow::Context;
use casegraph::config::{CacheBackend, ServerConfig};
use casegraph::store::{CacheStore, EmbeddedGraph, MemoryCache, MemoryDocumentStore, RedisCache};
use casegraph::{seed, AppState, GraphStore, HttpServer};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "casegraph-server", version, about = "CaseGraph crime-analytics API server")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "CASEGRAPH_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load(args.config.as_deref()).context("loading configuration")?;
    info!("CaseGraph v{}", casegraph::VERSION);

    let documents =
        MemoryDocumentStore::new(seed::NAME_FIELD, &seed::TEXT_FIELDS).context("creating document index")?;
    let people = if config.seed_demo_data {
        seed::load_documents(&documents).await.context("seeding case files")?;
        seed::people_graph().context("building demo graph")?
    } else {
        GraphStore::new()
    };
    info!(nodes = people.node_count(), edges = people.edge_count(), "graph ready");
    let graph = EmbeddedGraph::new(people).with_analytics(config.graph.analytics_enabled);

    let cache: Arc<dyn CacheStore> = match &config.cache.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::Redis(url) => {
            let cache = RedisCache::from_url(url).context("configuring cache")?;
            info!(address = cache.address(), "using Redis cache");
            Arc::new(cache)
        }
    };

    let state = AppState::new(Arc::new(documents), Arc::new(graph), cache, config.store_timeout());
    HttpServer::new(state, config.cors_layer(), config.bind_address())
        .start()
        .await
        .context("HTTP server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args() {
        Args::command().debug_assert();

        let args = Args::try_parse_from(["casegraph-server", "-c", "casegraph.yaml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("casegraph.yaml")));
        let args = Args::try_parse_from(["casegraph-server", "--config", "/etc/casegraph.yaml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/etc/casegraph.yaml")));

        assert!(Args::try_parse_from(["casegraph-server", "--config"]).is_err());
        assert!(Args::try_parse_from(["casegraph-server", "serve"]).is_err());
    }
}
