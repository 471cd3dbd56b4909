use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use internhub_db::Cascade;

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    pub cascade: Cascade,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.into());

        let host = var("INTERNHUB_HOST", "0.0.0.0");
        let port: u16 = var("INTERNHUB_PORT", "3000")
            .parse()
            .context("INTERNHUB_PORT must be a port number")?;
        let addr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let cascade = match var("INTERNHUB_ATOMIC_CASCADE", "true").to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Cascade::Atomic,
            "false" | "0" | "no" => Cascade::Sequential,
            other => anyhow::bail!("INTERNHUB_ATOMIC_CASCADE must be true or false, got '{}'", other),
        };

        Ok(Self {
            addr,
            db_path: var("INTERNHUB_DB_PATH", "internhub.db").into(),
            static_dir: var("INTERNHUB_STATIC_DIR", "public").into(),
            cascade,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.db_path, PathBuf::from("internhub.db"));
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.cascade, Cascade::Atomic);
    }

    #[test]
    fn overrides_and_sequential_cascade() {
        let config = load(&[
            ("INTERNHUB_HOST", "127.0.0.1"),
            ("INTERNHUB_PORT", "8080"),
            ("INTERNHUB_ATOMIC_CASCADE", "false"),
        ])
        .unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.cascade, Cascade::Sequential);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(load(&[("INTERNHUB_PORT", "http")]).is_err());
        assert!(load(&[("INTERNHUB_ATOMIC_CASCADE", "maybe")]).is_err());
    }
}
