use anyhow::{Context, Result};
use std::env;

/// Summarization model used when SUMMARIZER_MODEL is not set.
pub const DEFAULT_SUMMARIZER_MODEL: &str = "facebook/bart-large-cnn";

#[derive(Debug, Clone)]
pub struct Config {
    pub hf_api_token: String,
    pub summarizer_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let hf_api_token = env::var("HF_API_TOKEN").context(
            "HF_API_TOKEN not found.\n\n\
            To fix this, create ~/.config/make-podcast/.env with:\n  \
            HF_API_TOKEN=your_token_here\n\n\
            Get your Hugging Face API token from: https://huggingface.co/settings/tokens",
        )?;

        let summarizer_model =
            env::var("SUMMARIZER_MODEL").unwrap_or_else(|_| DEFAULT_SUMMARIZER_MODEL.to_string());

        Ok(Self {
            hf_api_token,
            summarizer_model,
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/make-podcast/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("make-podcast").join(".env");
            if config_path.exists() {
                if dotenvy::from_path(&config_path).is_ok() {
                    return;
                }
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                if dotenvy::from_path(&home_path).is_ok() {
                    return;
                }
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}
