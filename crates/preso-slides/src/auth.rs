//! OAuth access tokens for the Slides and Sheets APIs
//!
//! Token minting and refresh belong to the environment; these providers only
//! pick up whatever token it exposes:
//! 1. An environment variable (first of a configured list that is set)
//! 2. `gcloud auth print-access-token`, when enabled

use async_trait::async_trait;
use preso_core::{PresoError, RefresherConfig, Result};
use std::env;
use tokio::process::Command;

/// Source of bearer tokens for remote calls
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// Fixed token, mostly for tests and one-off scripts
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Reads a token from the first set environment variable
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    vars: Vec<String>,
}

impl EnvTokenProvider {
    pub fn new(vars: Vec<String>) -> Self {
        Self { vars }
    }

    fn lookup(&self) -> Option<(&str, String)> {
        self.vars.iter().find_map(|var| {
            env::var(var)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(|value| (var.as_str(), value.trim().to_string()))
        })
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn token(&self) -> Result<String> {
        match self.lookup() {
            Some((var, token)) => {
                tracing::debug!("Using access token from {}", var);
                Ok(token)
            }
            None => Err(PresoError::Auth(format!(
                "No access token found. Set one of: {}",
                self.vars.join(", ")
            ))),
        }
    }
}

/// Asks the gcloud CLI for the active account's access token
#[derive(Debug, Clone, Default)]
pub struct GcloudTokenProvider;

#[async_trait]
impl TokenProvider for GcloudTokenProvider {
    async fn token(&self) -> Result<String> {
        let output = Command::new("gcloud")
            .args(["auth", "print-access-token"])
            .output()
            .await
            .map_err(|e| PresoError::Auth(format!("Failed to run gcloud: {}", e)))?;

        if !output.status.success() {
            return Err(PresoError::Auth(format!(
                "gcloud auth print-access-token failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(PresoError::Auth("gcloud returned an empty token".to_string()));
        }
        tracing::debug!("Using access token from gcloud");
        Ok(token)
    }
}

/// Environment first, then gcloud if allowed
#[derive(Debug, Clone)]
pub struct ChainedTokenProvider {
    env: EnvTokenProvider,
    gcloud: Option<GcloudTokenProvider>,
}

impl ChainedTokenProvider {
    pub fn from_config(config: &RefresherConfig) -> Self {
        Self {
            env: EnvTokenProvider::new(config.token_env.clone()),
            gcloud: config.gcloud_fallback.then_some(GcloudTokenProvider),
        }
    }
}

#[async_trait]
impl TokenProvider for ChainedTokenProvider {
    async fn token(&self) -> Result<String> {
        match (self.env.token().await, &self.gcloud) {
            (Ok(token), _) => Ok(token),
            (Err(_), Some(gcloud)) => gcloud.token().await,
            (Err(e), None) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to prevent concurrent env var modifications
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_LOCK.lock().unwrap();

        let originals: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();

        for (key, value) in vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        let result = f();

        for (key, original) in originals {
            match original {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        result
    }

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(f)
    }

    fn provider() -> EnvTokenProvider {
        EnvTokenProvider::new(vec![
            "PRESO_TEST_TOKEN_A".to_string(),
            "PRESO_TEST_TOKEN_B".to_string(),
        ])
    }

    #[test]
    fn test_first_var_wins() {
        with_env_vars(
            &[
                ("PRESO_TEST_TOKEN_A", Some("token-a")),
                ("PRESO_TEST_TOKEN_B", Some("token-b")),
            ],
            || {
                let token = block_on(provider().token()).unwrap();
                assert_eq!(token, "token-a");
            },
        );
    }

    #[test]
    fn test_fallback_var_and_blank_skipped() {
        with_env_vars(
            &[
                ("PRESO_TEST_TOKEN_A", Some("   ")),
                ("PRESO_TEST_TOKEN_B", Some("token-b\n")),
            ],
            || {
                let token = block_on(provider().token()).unwrap();
                assert_eq!(token, "token-b");
            },
        );
    }

    #[test]
    fn test_no_token() {
        with_env_vars(
            &[("PRESO_TEST_TOKEN_A", None), ("PRESO_TEST_TOKEN_B", None)],
            || {
                let result = block_on(provider().token());
                assert!(matches!(result, Err(PresoError::Auth(_))));
            },
        );
    }

    #[test]
    fn test_chain_without_gcloud_reports_env_error() {
        let config = RefresherConfig {
            token_env: vec!["PRESO_TEST_TOKEN_UNSET".to_string()],
            gcloud_fallback: false,
            ..Default::default()
        };
        with_env_vars(&[("PRESO_TEST_TOKEN_UNSET", None)], || {
            let result = block_on(ChainedTokenProvider::from_config(&config).token());
            assert!(matches!(result, Err(PresoError::Auth(_))));
        });
    }

    #[tokio::test]
    async fn test_static_token() {
        let token = StaticToken("abc".to_string()).token().await.unwrap();
        assert_eq!(token, "abc");
    }
}
