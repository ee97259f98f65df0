use std::sync::Arc;

use agui_relay::ProviderAdapter;
use agui_relay::vendors::openai::OpenAiProvider;
use agui_server::api::{self, AppState};
use agui_server::config;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::init();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agui_server=debug,agui_relay=debug".into()),
        )
        .with_target(false)
        .init();

    let provider: Option<Arc<dyn ProviderAdapter>> = match OpenAiProvider::from_env() {
        Ok(provider) => Some(Arc::new(provider)),
        Err(err) => {
            warn!(
                error = %err,
                "OpenAI provider unavailable, /api/chat will answer with a configuration error"
            );
            None
        }
    };

    let app = api::app(AppState { provider });

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("AG-UI agent server running on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
