use stockpipe::config::{
    Config, DEFAULT_SYMBOL, DEFAULT_TARGET_TABLE, DEFAULT_WAREHOUSE_URL, ENV_SYMBOL,
    ENV_TARGET_TABLE, ENV_WAREHOUSE_URL,
};
use stockpipe::services::pipeline::PipelineService;
use stockpipe::sources::alpha_vantage::AlphaVantageSource;
use stockpipe::warehouse::Warehouse;

use anyhow::Context;
use clap::{App, Arg, SubCommand};
use log::info;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    // 创建基本的命令行应用
    let app = App::new("StockPipe")
        .version("0.1.0")
        .author("StockPipe Team")
        .about("Daily stock price pipeline: fetch, transform, load");

    // 添加子命令
    let app = app
        .subcommand(
            SubCommand::with_name("run")
                .about("Run the fetch-transform-load pipeline once")
                .arg(
                    Arg::with_name("symbol")
                        .short('s')
                        .long("symbol")
                        .value_name("SYMBOL")
                        .help("Stock symbol to fetch (overrides STOCKPIPE_SYMBOL)")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("table")
                        .short('t')
                        .long("table")
                        .value_name("TABLE")
                        .help("Target warehouse table (overrides STOCKPIPE_TARGET_TABLE)")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("window")
                        .short('w')
                        .long("window")
                        .value_name("DAYS")
                        .help("Number of most recent trading days to keep")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("warehouse")
                        .long("warehouse")
                        .value_name("URL")
                        .help("Warehouse connection string (overrides STOCKPIPE_WAREHOUSE_URL)")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("show")
                .about("Show recently loaded records from the warehouse")
                .arg(
                    Arg::with_name("symbol")
                        .short('s')
                        .long("symbol")
                        .value_name("SYMBOL")
                        .help("Stock symbol to display")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("table")
                        .short('t')
                        .long("table")
                        .value_name("TABLE")
                        .help("Warehouse table to read from")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Limit the number of records to display")
                        .takes_value(true)
                        .default_value("10"),
                )
                .arg(
                    Arg::with_name("warehouse")
                        .long("warehouse")
                        .value_name("URL")
                        .help("Warehouse connection string (overrides STOCKPIPE_WAREHOUSE_URL)")
                        .takes_value(true),
                ),
        );

    let matches = app.get_matches();

    if let Some(matches) = matches.subcommand_matches("run") {
        let mut config = Config::from_env().context("failed to load pipeline configuration")?;

        // 命令行参数优先于环境变量
        if let Some(symbol) = matches.value_of("symbol") {
            config = config.with_symbol(symbol);
        }
        if let Some(table) = matches.value_of("table") {
            config = config.with_target_table(table);
        }
        if let Some(url) = matches.value_of("warehouse") {
            config = config.with_warehouse_url(url);
        }
        if let Some(window) = matches.value_of("window") {
            let days = window
                .parse::<usize>()
                .context("window must be a positive integer")?;
            config = config.with_window_days(days);
        }

        info!(
            "Running pipeline for {} into table {}",
            config.symbol, config.target_table
        );

        let source = Arc::new(AlphaVantageSource::with_base_url(
            &config.api_key,
            &config.api_base_url,
        )?);
        let service = PipelineService::new(config, source);
        let summary = service.run_once().await?;

        info!(
            "Run complete: fetched {} entries, loaded {} records for {}",
            summary.fetched, summary.loaded, summary.symbol
        );
    } else if let Some(matches) = matches.subcommand_matches("show") {
        // show 只读仓库，不需要API key，不走Config::from_env
        let warehouse_url = matches
            .value_of("warehouse")
            .map(str::to_string)
            .or_else(|| env::var(ENV_WAREHOUSE_URL).ok())
            .unwrap_or_else(|| DEFAULT_WAREHOUSE_URL.to_string());
        let table = matches
            .value_of("table")
            .map(str::to_string)
            .or_else(|| env::var(ENV_TARGET_TABLE).ok())
            .unwrap_or_else(|| DEFAULT_TARGET_TABLE.to_string());
        let symbol = matches
            .value_of("symbol")
            .map(str::to_string)
            .or_else(|| env::var(ENV_SYMBOL).ok())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());
        let limit = matches
            .value_of("limit")
            .unwrap_or("10")
            .parse::<i64>()
            .unwrap_or(10);

        let warehouse = Warehouse::connect(&warehouse_url)
            .await
            .context("failed to connect to warehouse")?;
        let records = warehouse.recent_records(&table, &symbol, limit).await?;

        info!("Found {} records for {} in {}", records.len(), symbol, table);

        // 显示结果
        info!("{:-<66}", "");
        info!(
            "{:<12} {:<10} {:<10} {:<10} {:<10} {:<12}",
            "Date", "Open", "High", "Low", "Close", "Volume"
        );
        info!("{:-<66}", "");

        for record in &records {
            let date_str = record.date.to_string();
            info!(
                "{:<12} {:<10.2} {:<10.2} {:<10.2} {:<10.2} {:<12}",
                date_str, record.open, record.high, record.low, record.close, record.volume
            );
        }

        if records.is_empty() {
            info!("No records found for {}", symbol);
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
