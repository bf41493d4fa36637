//! skillbridge binary: composition root.
//!
//! Wires the audit logger, the Talent API tool catalog, the executor, the
//! MCP stdio server, and the HTTP read surface together. The MCP protocol
//! owns stdout, so logs go to stderr.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use skillbridge_audit::{AuditLogger, QueryApi};
use skillbridge_server::{cors_layer, serve};
use skillbridge_tools::audit_tools::register_audit_tools;
use skillbridge_tools::catalog::register_talent_tools;
use skillbridge_tools::resources::ResourceSet;
use skillbridge_tools::{ExecutorConfig, McpServer, TalentApi, ToolExecutor, ToolRegistry};
use skillbridge_types::BridgeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = BridgeConfig::load().context("failed to load configuration")?;

    // Audit storage failure at startup is fatal; there is no fallback store.
    let logger = AuditLogger::new(&config.audit_db_path);
    logger
        .initialize()
        .await
        .context("failed to initialize audit storage")?;

    let api = Arc::new(TalentApi::new(&config)?);
    let registry = ToolRegistry::new();
    register_talent_tools(&registry, api)?;

    let query = QueryApi::new(logger.clone());
    register_audit_tools(&registry, query.clone())?;

    // The HTTP client timeout fires first; the executor deadline is the
    // backstop for tools that stall before the request is even sent.
    let executor_config = ExecutorConfig {
        default_timeout_ms: (config.tm_api_timeout_secs * 1000.0) as u64 + 5_000,
    };
    let executor = ToolExecutor::new(
        registry.clone(),
        executor_config,
        Arc::new(logger.clone()),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let listen_addr = config.listen_addr();
    let cors = cors_layer(&config.cors_origins);
    let http_task = tokio::spawn(async move {
        if let Err(e) = serve(&listen_addr, query, cors, shutdown_rx).await {
            error!(error = %e, "audit read surface exited");
        }
    });

    info!(tools = registry.tool_count(), "serving MCP over stdio");
    let server = McpServer::new(
        registry,
        executor,
        ResourceSet::new(&config.resources_dir),
    );
    server
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    // stdin EOF: stop the HTTP side and release the store.
    let _ = shutdown_tx.send(true);
    let _ = http_task.await;
    logger.close().await;
    info!("shutdown complete");
    Ok(())
}
