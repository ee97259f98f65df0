use std::env;

const DEFAULT_PORT: u16 = 3001;

/// Loads environment variables from `.env` files, if present.
pub fn init() {
    let _ = dotenvy::from_path(format!("{}/.env", env!("CARGO_MANIFEST_DIR")));
    dotenvy::dotenv().ok();
}

/// Returns the socket address to bind, honoring `PORT`.
pub fn bind_addr() -> String {
    let port = match env::var("PORT") {
        Ok(raw) => match raw.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                tracing::warn!(value = %raw, "invalid PORT value, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        },
        Err(_) => DEFAULT_PORT,
    };
    format!("0.0.0.0:{port}")
}
