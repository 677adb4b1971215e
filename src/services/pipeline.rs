use crate::config::Config;
use crate::errors::Result;
use crate::sources::base::DailySeriesSource;
use crate::transform::transform_series;
use crate::warehouse::Warehouse;
use log::info;
use std::sync::Arc;

/// 单次运行的结果统计
#[derive(Debug)]
pub struct RunSummary {
    pub symbol: String,
    pub fetched: usize,
    pub loaded: u64,
}

/// 管道服务，串联抓取、整形和入库三个阶段
pub struct PipelineService {
    config: Config,
    source: Arc<dyn DailySeriesSource + Send + Sync>,
}

impl PipelineService {
    /// 创建新的管道服务实例
    pub fn new(config: Config, source: Arc<dyn DailySeriesSource + Send + Sync>) -> Self {
        Self { config, source }
    }

    /// 执行一次完整的抓取-整形-入库流程
    ///
    /// 任一阶段失败即中止，错误原样上抛，后续阶段不再执行。
    pub async fn run_once(&self) -> Result<RunSummary> {
        let symbol = &self.config.symbol;

        info!(
            "Fetching daily series for {} from {}",
            symbol,
            self.source.provider_code()
        );
        let raw = self.source.fetch_daily_series(symbol).await?;
        info!("Fetched {} raw entries for {}", raw.len(), symbol);

        let records = transform_series(&raw, symbol, self.config.window_days)?;
        info!(
            "Transformed into {} records (window {} days)",
            records.len(),
            self.config.window_days
        );

        let warehouse = Warehouse::connect(&self.config.warehouse_url).await?;
        let loaded = warehouse
            .load_records(&self.config.target_table, &records)
            .await?;
        info!("Successfully loaded {} records for {}", loaded, symbol);

        Ok(RunSummary {
            symbol: symbol.clone(),
            fetched: raw.len(),
            loaded,
        })
    }
}
