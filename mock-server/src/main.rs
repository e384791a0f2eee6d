use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_server=debug,tower_http=info".into()),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let token = std::env::var("BRANCH_API_TOKEN").ok().filter(|t| !t.is_empty());
    tracing::info!(%addr, auth = token.is_some(), "mock branch API listening");
    mock_server::run_with(listener, mock_server::app_with(mock_server::fixtures(), token)).await
}
