use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub model_path: String,
    pub transactions_table: String,
    pub db_max_connections: u32,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}...", url_preview(&config.database_url));
        tracing::debug!("Model path: {}", config.model_path);
        tracing::debug!("Transactions table: {}", config.transactions_table);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Build the configuration from any key lookup (environment, map in tests).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database_url: lookup("DB_URL")
                .or_else(|| lookup("DATABASE_URL"))
                .ok_or_else(|| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: lookup("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            model_path: lookup("MODEL_PATH")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "model.onnx".to_string()),
            transactions_table: validate_table_name(
                lookup("TRANSACTIONS_TABLE")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| "curr_trans".to_string()),
            )?,
            db_max_connections: parse_positive(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            rate_limit_per_second: parse_positive(&lookup, "RATE_LIMIT_PER_SECOND", 10)?,
            rate_limit_burst: parse_positive(&lookup, "RATE_LIMIT_BURST", 20)?,
        })
    }
}

/// First 20 characters of a connection URL, for logging.
fn url_preview(url: &str) -> String {
    url.chars().take(20).collect()
}

/// The table name is interpolated into SQL, so only plain identifiers pass.
fn validate_table_name(name: String) -> anyhow::Result<String> {
    if !is_valid_table_name(&name) {
        anyhow::bail!(
            "TRANSACTIONS_TABLE must be a table name like 'curr_trans' or 'svista.curr_trans'"
        );
    }
    Ok(name)
}

/// Plain or schema-qualified SQL identifier: `[A-Za-z_][A-Za-z0-9_]*` parts joined by one dot.
pub fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return false;
    }

    parts.iter().all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    })
}

fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + From<u8>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().parse::<T>() {
        Ok(value) if value >= T::from(1) => Ok(value),
        _ => anyhow::bail!("{} must be a positive integer", key),
    }
}
