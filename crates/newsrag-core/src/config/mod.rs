mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

use crate::vault::{API_KEY_VAR, Secret, VaultProvider};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the resulting values fail [`Config::validate`].
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.splitter.chunk_size == 0 {
            bail!("splitter.chunk_size must be greater than 0");
        }
        if self.splitter.separators.iter().any(String::is_empty) {
            bail!("splitter.separators must not contain empty strings");
        }
        if self.index.top_k == 0 {
            bail!("index.top_k must be greater than 0");
        }
        if self.loader.max_urls == 0 {
            bail!("loader.max_urls must be greater than 0");
        }
        if self.loader.timeout == 0 {
            bail!("loader.timeout must be greater than 0");
        }
        let base = url::Url::parse(&self.llm.base_url)
            .with_context(|| format!("invalid llm.base_url: {}", self.llm.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!("llm.base_url must use http or https, got {}", base.scheme());
        }
        Ok(())
    }

    /// Resolve sensitive configuration values through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        if let Some(val) = vault.get_secret(API_KEY_VAR).await?
            && !val.trim().is_empty()
        {
            self.secrets.openai_api_key = Some(Secret::new(val.trim()));
        }
        Ok(())
    }
}
