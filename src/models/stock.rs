use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 行情API返回的单日报价，字段值均为字符串
#[derive(Debug, Clone, Deserialize)]
pub struct DailyQuote {
    #[serde(rename = "1. open")]
    pub open: String,
    #[serde(rename = "2. high")]
    pub high: String,
    #[serde(rename = "3. low")]
    pub low: String,
    #[serde(rename = "4. close")]
    pub close: String,
    #[serde(rename = "5. volume")]
    pub volume: String,
}

/// Raw daily series as returned by the provider: date string -> quote
pub type RawSeries = HashMap<String, DailyQuote>;

/// 入库的扁平日线记录
#[derive(Debug, Clone, Serialize)]
pub struct StockRecord {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub symbol: String,
    pub date: NaiveDate,
}
