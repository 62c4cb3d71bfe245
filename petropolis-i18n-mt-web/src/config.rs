use clap::Parser;
use std::net::SocketAddr;

/// Server configuration, from flags or the environment (`.env` is honoured)
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Petropolis machine translation API", long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "PETROPOLIS_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Postgres connection string for the layer tables
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    #[arg(long, env = "DEEPL_API_KEY", hide_env_values = true)]
    pub deepl_api_key: String,

    /// Override the DeepL endpoint (defaults from the key type)
    #[arg(long, env = "DEEPL_API_URL")]
    pub deepl_api_url: Option<String>,

    /// Layers open for bulk translation; empty allows any
    #[arg(long, env = "PETROPOLIS_LAYERS", value_delimiter = ',')]
    pub layers: Vec<String>,

    /// `token=cap|cap,other=cap`
    #[arg(long, env = "PETROPOLIS_API_TOKENS", hide_env_values = true, default_value = "")]
    pub api_tokens: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "petropolis-mt-web",
            "--bind",
            "0.0.0.0:8080",
            "--database-url",
            "postgres://localhost/petropolis",
            "--deepl-api-key",
            "key:fx",
            "--layers",
            "oil_plants,coal_mines",
            "--api-tokens",
            "abc=edit_html",
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.layers, vec!["oil_plants", "coal_mines"]);
        assert_eq!(config.deepl_api_url, None);
        assert_eq!(config.api_tokens, "abc=edit_html");
    }
}
