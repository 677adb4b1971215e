use crate::errors::{PipelineError, Result};
use crate::models::stock::RawSeries;
use crate::sources::base::DailySeriesSource;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// 响应体中日线序列所在的字段名
const SERIES_KEY: &str = "Time Series (Daily)";

/// Alpha Vantage 日线行情抓取器
pub struct AlphaVantageSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageSource {
    /// 创建新的行情抓取器
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, "https://www.alphavantage.co")
    }

    /// 指定接口地址创建，便于接入测试端点
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PipelineError::RequestError(e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// 解析响应体，提取日线序列
    /// 缺少预期字段时带上原始响应体报错，便于诊断限流等情况
    fn parse_daily_body(body: &str) -> Result<RawSeries> {
        let json: Value = serde_json::from_str(body)
            .map_err(|_| PipelineError::MalformedResponse(body.to_string()))?;

        match json.get(SERIES_KEY) {
            Some(series) => {
                let series: RawSeries = serde_json::from_value(series.clone())?;
                Ok(series)
            }
            None => Err(PipelineError::MalformedResponse(body.to_string())),
        }
    }
}

#[async_trait]
impl DailySeriesSource for AlphaVantageSource {
    fn provider_code(&self) -> &'static str {
        "ALPHAVANTAGE"
    }

    async fn fetch_daily_series(&self, symbol: &str) -> Result<RawSeries> {
        info!("Fetching daily series for {} from Alpha Vantage", symbol);

        let response = self.client
            .get(format!("{}/query", self.base_url))
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::RequestError(e))?;

        // 非200一律视为抓取失败，状态码原样上抛
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(PipelineError::FetchFailed(status));
        }

        let body = response.text().await?;
        debug!("成功获取响应，长度 {} 字节", body.len());

        let series = Self::parse_daily_body(&body)?;
        info!("获取到 {} 条日线记录", series.len());

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily_body(days: &[&str]) -> String {
        let mut entries = Vec::new();
        for (i, day) in days.iter().enumerate() {
            entries.push(format!(
                r#""{}": {{"1. open": "{}.0", "2. high": "{}.5", "3. low": "{}.0", "4. close": "{}.2", "5. volume": "{}00"}}"#,
                day,
                100 + i,
                101 + i,
                99,
                100 + i,
                12 + i,
            ));
        }
        format!(
            r#"{{"Meta Data": {{"2. Symbol": "ISRG"}}, "Time Series (Daily)": {{{}}}}}"#,
            entries.join(",")
        )
    }

    #[test]
    fn parses_daily_series_body() {
        let body = daily_body(&["2024-01-03", "2024-01-02", "2024-01-01"]);
        let series = AlphaVantageSource::parse_daily_body(&body).unwrap();

        assert_eq!(series.len(), 3);
        let quote = series.get("2024-01-02").unwrap();
        assert_eq!(quote.open, "101.0");
        assert_eq!(quote.volume, "1300");
    }

    #[test]
    fn missing_series_key_reports_raw_body() {
        // 限流时提供商返回200和一个Note字段
        let body = r#"{"Note": "rate limited"}"#;
        let err = AlphaVantageSource::parse_daily_body(body).unwrap_err();

        match err {
            PipelineError::MalformedResponse(raw) => assert!(raw.contains("rate limited")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = AlphaVantageSource::parse_daily_body("<html>busy</html>").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedResponse(_)));
    }

    #[test]
    fn fetch_error_carries_status_code() {
        let err = PipelineError::FetchFailed(reqwest::StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "error fetching data: HTTP status 404 Not Found");
    }

    /// 起一个本地单次HTTP端点，返回固定状态行和响应体
    async fn one_shot_endpoint(status_line: &'static str, body: String) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn fetch_returns_series_on_200() {
        let body = daily_body(&["2024-01-03", "2024-01-02"]);
        let base_url = one_shot_endpoint("200 OK", body).await;

        let source = AlphaVantageSource::with_base_url("demo-key", &base_url).unwrap();
        let series = source.fetch_daily_series("ISRG").await.unwrap();

        assert_eq!(series.len(), 2);
        assert!(series.contains_key("2024-01-03"));
    }

    #[tokio::test]
    async fn fetch_fails_with_status_on_404() {
        let base_url = one_shot_endpoint("404 Not Found", "not here".to_string()).await;

        let source = AlphaVantageSource::with_base_url("demo-key", &base_url).unwrap();
        let err = source.fetch_daily_series("ISRG").await.unwrap_err();

        match err {
            PipelineError::FetchFailed(status) => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_rejects_200_without_series_key() {
        let base_url =
            one_shot_endpoint("200 OK", r#"{"Note": "rate limited"}"#.to_string()).await;

        let source = AlphaVantageSource::with_base_url("demo-key", &base_url).unwrap();
        let err = source.fetch_daily_series("ISRG").await.unwrap_err();

        assert!(matches!(err, PipelineError::MalformedResponse(_)));
    }
}
