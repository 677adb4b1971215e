use crate::errors::Result;
use crate::models::stock::{RawSeries, StockRecord};
use chrono::NaiveDate;

/// 默认回溯窗口：最近90个交易日
pub const DEFAULT_WINDOW_DAYS: usize = 90;

/// 将原始日线序列整形为带symbol和date的扁平记录
///
/// 先按日期显式降序排序再截取，不依赖提供商的返回顺序；
/// 结果为最新在前的最近 `window` 条记录。
pub fn transform_series(series: &RawSeries, symbol: &str, window: usize) -> Result<Vec<StockRecord>> {
    let mut records = Vec::with_capacity(series.len());

    for (date_str, quote) in series {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?;

        records.push(StockRecord {
            open: quote.open.parse::<f64>()?,
            high: quote.high.parse::<f64>()?,
            low: quote.low.parse::<f64>()?,
            close: quote.close.parse::<f64>()?,
            volume: quote.volume.parse::<i64>()?,
            symbol: symbol.to_string(),
            date,
        });
    }

    // 按日期降序排序，保留最近window条
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records.truncate(window);

    Ok(records)
}
