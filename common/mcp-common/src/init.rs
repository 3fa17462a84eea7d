//! Server startup: tracing setup and the `serve_stdio!` macro

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the tracing subscriber
///
/// Logs go to stderr because stdout carries the MCP protocol:
/// - plain text without ANSI colors by default
/// - JSON lines when `LOG_FORMAT=json`
/// - filtered by `RUST_LOG`, with `<crate_name>=info` always added
///
/// # Arguments
///
/// * `crate_name` - Module path of the server binary (e.g. `"sysdiag_mcp"`)
///
/// # Errors
///
/// Fails when `crate_name` does not form a valid filter directive.
///
/// # Example
///
/// ```rust,ignore
/// mcp_common::init_tracing("sysdiag_mcp")?;
/// ```
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    }

    Ok(())
}

/// Generate `main` for a stdio MCP server
///
/// # Arguments
///
/// * `$server_type` - Server type with an inherent `new()` constructor
/// * `$crate_name` - String literal used for the log filter and startup line
///
/// # Example
///
/// ```rust,ignore
/// use sysdiag_mcp::SysDiagMcpServer;
///
/// mcp_common::serve_stdio!(SysDiagMcpServer, "sysdiag_mcp");
/// ```
///
/// The generated `#[tokio::main]` function:
/// 1. installs tracing via [`init_tracing`](crate::init_tracing)
/// 2. builds the server with `<$server_type>::new()`
/// 3. serves it over the stdio transport
/// 4. returns once the client disconnects
#[macro_export]
macro_rules! serve_stdio {
    ($server_type:ty, $crate_name:expr) => {
        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            use rmcp::ServiceExt;

            $crate::init_tracing($crate_name)?;

            tracing::info!(concat!("Starting ", $crate_name, " MCP Server"));

            let server = <$server_type>::new();
            let service = server.serve(rmcp::transport::stdio()).await?;

            tracing::info!("Server running, waiting for requests...");

            service.waiting().await?;

            tracing::info!("Server shutting down");
            Ok(())
        }
    };
}
