use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub upstream_url: String,
    pub bind_addr: String,
    pub api_token: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let upstream_url = env::var("SCHEDULER_UPSTREAM_URL")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        // Token fallback chain; an empty token makes the proxy refuse
        // to forward instead of sending unauthenticated requests.
        let api_token = env::var("SCHEDULER_API_TOKEN")
            .or_else(|_| env::var("API_TOKEN"))
            .unwrap_or_default();

        Ok(Self {
            upstream_url,
            bind_addr,
            api_token,
        })
    }
}
