use dotenvy::dotenv;
use std::env;

pub const MIN_CHUNK_SIZE: usize = 5;
pub const MAX_CHUNK_SIZE: usize = 200;

pub struct Config {
    /// Argon2 hash of the bearer token allowed to administer the catalog.
    pub admin_token_hash: String,
    pub default_chunk_size: usize,
    /// Inactivity TTL of job documents and owner pointers.
    pub job_ttl_secs: i64,
    pub resolve_batch_size: usize,
    pub sweep_interval_secs: u64,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let admin_token_hash = match env::var("STOCKSYNC_ADMIN_TOKEN_HASH") {
            Ok(val) => val,
            Err(_) => panic!("You need to set env STOCKSYNC_ADMIN_TOKEN_HASH"),
        };

        let default_chunk_size = match env::var("STOCKSYNC_DEFAULT_CHUNK_SIZE") {
            Ok(val) => clamp_chunk_size(val.parse::<usize>().unwrap_or(25)),
            Err(_) => 25,
        };

        let job_ttl_secs = match env::var("STOCKSYNC_JOB_TTL_SECS") {
            Ok(val) => val.parse::<i64>().unwrap_or(1800).max(60),
            Err(_) => 1800,
        };

        let resolve_batch_size = match env::var("STOCKSYNC_RESOLVE_BATCH_SIZE") {
            Ok(val) => val.parse::<usize>().unwrap_or(500).clamp(1, 500),
            Err(_) => 500,
        };

        let sweep_interval_secs = match env::var("STOCKSYNC_SWEEP_INTERVAL_SECS") {
            Ok(val) => val.parse::<u64>().unwrap_or(60).max(1),
            Err(_) => 60,
        };

        let port = match env::var("STOCKSYNC_PORT") {
            Ok(val) => val.parse::<u16>().unwrap_or(8080),
            Err(_) => 8080,
        };

        Self {
            admin_token_hash,
            default_chunk_size,
            job_ttl_secs,
            resolve_batch_size,
            sweep_interval_secs,
            port,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_token_hash: String::new(),
            default_chunk_size: 25,
            job_ttl_secs: 1800,
            resolve_batch_size: 500,
            sweep_interval_secs: 60,
            port: 8080,
        }
    }
}

/// Keeps a requested chunk size inside the accepted bounds.
pub fn clamp_chunk_size(requested: usize) -> usize {
    requested.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_chunk_size() {
        assert_eq!(clamp_chunk_size(0), MIN_CHUNK_SIZE);
        assert_eq!(clamp_chunk_size(1000), MAX_CHUNK_SIZE);
        assert_eq!(clamp_chunk_size(50), 50);
    }
}
