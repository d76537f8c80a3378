use serde::Deserialize;
use std::path::PathBuf;

/// Presentation service configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Trimmed review table the model is fitted on
    #[serde(default = "default_trimmed_file")]
    pub data_file: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of similar games listed when the caller does not ask for a count
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Offline evaluation settings, read from `EVAL_`-prefixed variables
#[derive(Debug, Deserialize, Clone)]
pub struct EvalConfig {
    #[serde(default = "default_trimmed_file")]
    pub data_file: PathBuf,

    /// Fraction of interactions held out for testing
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    #[serde(default = "default_seed")]
    pub split_seed: u64,

    /// Number of train users scored per strategy
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    #[serde(default = "default_seed")]
    pub sample_seed: u64,

    /// Seed for the random baseline. Unset means a fresh draw every run.
    #[serde(default)]
    pub random_seed: Option<u64>,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Print the report as JSON instead of labeled text
    #[serde(default)]
    pub json: bool,
}

/// Thresholds for trimming the raw review dump, read from `TRIM_`-prefixed variables
#[derive(Debug, Deserialize, Clone)]
pub struct TrimConfig {
    #[serde(default = "default_raw_file")]
    pub input_file: PathBuf,

    #[serde(default = "default_trimmed_file")]
    pub output_file: PathBuf,

    #[serde(default = "default_min_games_per_user")]
    pub min_games_per_user: usize,

    #[serde(default = "default_min_item_ratings")]
    pub min_item_ratings: usize,
}

fn default_trimmed_file() -> PathBuf {
    PathBuf::from("steam_reviews_trimmed.csv")
}

fn default_raw_file() -> PathBuf {
    PathBuf::from("steam_reviews.csv")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_top_k() -> usize {
    10
}

fn default_test_ratio() -> f64 {
    0.1
}

fn default_seed() -> u64 {
    42
}

fn default_sample_size() -> usize {
    300
}

fn default_min_games_per_user() -> usize {
    10
}

fn default_min_item_ratings() -> usize {
    100
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        if config.top_k == 0 {
            anyhow::bail!("TOP_K must be at least 1");
        }
        Ok(config)
    }
}

impl EvalConfig {
    /// Load evaluation settings from `EVAL_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::prefixed("EVAL_")
            .from_env::<EvalConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load evaluation config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            anyhow::bail!("EVAL_TEST_RATIO must be in (0, 1), got {}", self.test_ratio);
        }
        if self.top_k == 0 {
            anyhow::bail!("EVAL_TOP_K must be at least 1");
        }
        if self.sample_size == 0 {
            anyhow::bail!("EVAL_SAMPLE_SIZE must be at least 1");
        }
        Ok(())
    }
}

impl TrimConfig {
    /// Load trimming thresholds from `TRIM_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("TRIM_")
            .from_env::<TrimConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load trim config: {}", e))
    }
}
