use crate::errors::Result;
use crate::models::stock::RawSeries;
use async_trait::async_trait;

/// Base trait for daily time-series sources
#[async_trait]
pub trait DailySeriesSource {
    /// Get the provider code this source is for
    fn provider_code(&self) -> &'static str;

    /// Fetch the raw daily series for a specific symbol
    /// Returns the provider's date -> quote mapping, unordered
    async fn fetch_daily_series(&self, symbol: &str) -> Result<RawSeries>;
}
