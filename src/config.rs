use crate::errors::{PipelineError, Result};
use crate::transform::DEFAULT_WINDOW_DAYS;
use std::env;

// 环境变量名
pub const ENV_API_KEY: &str = "STOCKPIPE_API_KEY";
pub const ENV_BASE_URL: &str = "STOCKPIPE_BASE_URL";
pub const ENV_SYMBOL: &str = "STOCKPIPE_SYMBOL";
pub const ENV_TARGET_TABLE: &str = "STOCKPIPE_TARGET_TABLE";
pub const ENV_WAREHOUSE_URL: &str = "STOCKPIPE_WAREHOUSE_URL";
pub const ENV_WINDOW_DAYS: &str = "STOCKPIPE_WINDOW_DAYS";

// 缺省配置，CLI和Config共用同一套
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
pub const DEFAULT_SYMBOL: &str = "ISRG";
pub const DEFAULT_TARGET_TABLE: &str = "stock_price";
pub const DEFAULT_WAREHOUSE_URL: &str = "sqlite://data/stockpipe.db?mode=rwc";

#[derive(Debug)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub symbol: String,
    pub target_table: String,
    pub warehouse_url: String,
    pub window_days: usize,
}

impl Config {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            target_table: DEFAULT_TARGET_TABLE.to_string(),
            warehouse_url: DEFAULT_WAREHOUSE_URL.to_string(),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    /// 从环境变量构建配置；API key必须设置，其余项缺省时用默认值
    pub fn from_env() -> Result<Self> {
        let api_key = env::var(ENV_API_KEY).map_err(|_| {
            PipelineError::ConfigError(format!(
                "environment variable {} is not set",
                ENV_API_KEY
            ))
        })?;

        let mut config = Config::new(&api_key);

        if let Ok(base_url) = env::var(ENV_BASE_URL) {
            config.api_base_url = base_url;
        }
        if let Ok(symbol) = env::var(ENV_SYMBOL) {
            config.symbol = symbol;
        }
        if let Ok(table) = env::var(ENV_TARGET_TABLE) {
            config.target_table = table;
        }
        if let Ok(url) = env::var(ENV_WAREHOUSE_URL) {
            config.warehouse_url = url;
        }
        if let Ok(days) = env::var(ENV_WINDOW_DAYS) {
            config.window_days = match days.parse() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(PipelineError::ConfigError(format!(
                        "{} must be a positive integer, got {:?}",
                        ENV_WINDOW_DAYS, days
                    )))
                }
            };
        }

        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.to_string();
        self
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = symbol.to_string();
        self
    }

    pub fn with_target_table(mut self, table: &str) -> Self {
        self.target_table = table.to_string();
        self
    }

    pub fn with_warehouse_url(mut self, url: &str) -> Self {
        self.warehouse_url = url.to_string();
        self
    }

    pub fn with_window_days(mut self, days: usize) -> Self {
        self.window_days = days;
        self
    }
}
