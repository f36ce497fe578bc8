use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Runs the mock posts API. `HOST` and `PORT` pick the bind address;
/// `PORT=0` asks the OS for a free port. `RUST_LOG` filters output.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;

    let addr = listener.local_addr()?;
    tracing::info!(%addr, bearer_token = mock_server::VALID_TOKEN, "mock API listening");
    mock_server::run(listener).await
}
