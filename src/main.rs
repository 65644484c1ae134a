use std::sync::Arc;

use dotenv::dotenv;

use vitrail::config::Config;
use vitrail::elicitation::ElicitationTarget;
use vitrail::gemini::GeminiClient;
use vitrail::imagen::ImagenClient;
use vitrail::rate_limiter::RateLimiter;
use vitrail::service::{self, AppState};
use vitrail::transcript::Transcript;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("configuration");

    let transcript = config
        .transcript_path
        .as_deref()
        .map(|path| Arc::new(Transcript::new(path).expect("transcript file")));

    let state = AppState {
        backend: Arc::new(GeminiClient::new(
            &config.gemini_endpoint,
            &config.chat_model,
            &config.gemini_api_key,
            config.request_timeout,
        )),
        imagen: Arc::new(ImagenClient::new(
            &config.gemini_endpoint,
            &config.image_model,
            &config.gemini_api_key,
            config.request_timeout,
        )),
        generate_gate: Arc::new(RateLimiter::new(config.generate_cooldown)),
        transcript,
        target: ElicitationTarget::default(),
    };

    let app = service::router(state);

    tracing::info!("vitrail listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
