use clap::Parser;

// CLI/environment configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "market-gateway")]
#[command(about = "Rate-limited aggregation proxy for the CSFloat market API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8787)]
    pub port: u16,

    // Upstream market API base URL
    #[arg(long, env = "UPSTREAM_BASE", default_value = "https://csfloat.com")]
    pub upstream_base: String,

    // API key attached to outbound upstream requests only,
    // never reflected back to the caller
    #[arg(long, env = "UPSTREAM_API_KEY")]
    pub api_key: Option<String>,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 60)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // Collections cache TTL in seconds
    #[arg(long, env = "COLLECTIONS_TTL", default_value_t = 600)]
    pub collections_ttl: u64,

    // Path to the static collection catalog (JSON array of {id, name, api_id});
    // a missing file degrades resolution to heuristic-only
    #[arg(long, env = "COLLECTIONS_FILE", default_value = "collections.json")]
    pub collections_file: String,
}
