use std::env;
use std::net::SocketAddr;
use std::time::Duration;

pub struct Config {
    pub gemini_api_key: String,
    pub gemini_endpoint: String,
    pub chat_model: String,
    pub image_model: String,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    pub generate_cooldown: Duration,
    pub transcript_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let gemini_api_key = env::var("GEMINI_API_KEY").map_err(|_| "GEMINI_API_KEY must be set")?;

        let gemini_endpoint = env::var("GEMINI_ENDPOINT")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let chat_model =
            env::var("GEMINI_CHAT_MODEL").unwrap_or_else(|_| "gemini-flash-latest".to_string());
        let image_model = env::var("GEMINI_IMAGE_MODEL")
            .unwrap_or_else(|_| "imagen-3.0-generate-001".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()?;

        let request_timeout = Duration::from_secs(
            env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
        );
        let generate_cooldown = Duration::from_secs(
            env::var("GENERATE_COOLDOWN_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
        );

        let transcript_path = env::var("TRANSCRIPT_PATH").ok();

        Ok(Self {
            gemini_api_key,
            gemini_endpoint,
            chat_model,
            image_model,
            bind_addr,
            request_timeout,
            generate_cooldown,
            transcript_path,
        })
    }
}
