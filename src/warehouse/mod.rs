use crate::errors::{PipelineError, Result};
use crate::models::stock::StockRecord;
use chrono::NaiveDate;
use log::{info, warn};
use sqlx::{any::AnyPoolOptions, Any, AnyPool, Row};
use std::path::Path;

/// 数据仓库访问层，连接由DSN决定后端（sqlite/postgres）
pub struct Warehouse {
    pool: AnyPool,
}

impl Warehouse {
    /// 按连接串建立仓库连接
    pub async fn connect(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();

        // sqlite文件库需要父目录已存在
        ensure_sqlite_parent_dir(url)?;

        let pool = AnyPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    /// 在单个事务内建表（如缺失）并逐条写入记录
    ///
    /// 全部成功才提交；插入阶段任一失败则显式回滚并上抛原始错误，
    /// 不允许部分写入。空记录序列也会建表并提交空事务。
    pub async fn load_records(&self, table: &str, records: &[StockRecord]) -> Result<u64> {
        validate_table_ident(table)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query::<Any>(&create_table_sql(table))
            .execute(&mut *tx)
            .await?;

        let insert_sql = insert_record_sql(table);
        let mut loaded = 0u64;

        for record in records {
            let result = sqlx::query::<Any>(&insert_sql)
                .bind(record.open)
                .bind(record.high)
                .bind(record.low)
                .bind(record.close)
                .bind(record.volume)
                .bind(record.date.format("%Y-%m-%d").to_string())
                .bind(record.symbol.as_str())
                .execute(&mut *tx)
                .await;

            match result {
                Ok(_) => loaded += 1,
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!("Rollback failed after insert error: {}", rollback_err);
                    }
                    return Err(PipelineError::LoadFailed(e));
                }
            }
        }

        tx.commit().await?;
        info!("Committed {} records into {}", loaded, table);

        Ok(loaded)
    }

    /// 按symbol读取最近limit条记录，最新在前
    pub async fn recent_records(
        &self,
        table: &str,
        symbol: &str,
        limit: i64,
    ) -> Result<Vec<StockRecord>> {
        validate_table_ident(table)?;

        // date列按声明类型为date，Any驱动无法直接解码，读取时统一转成文本
        let rows = sqlx::query::<Any>(&format!(
            "SELECT open, high, low, close, volume, symbol, \
             CAST(date AS varchar) AS date FROM {} \
             WHERE symbol = $1 ORDER BY date DESC LIMIT $2",
            table
        ))
        .bind(symbol)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let date: String = row.try_get("date")?;
            records.push(StockRecord {
                open: row.try_get("open")?,
                high: row.try_get("high")?,
                low: row.try_get("low")?,
                close: row.try_get("close")?,
                volume: row.try_get("volume")?,
                symbol: row.try_get("symbol")?,
                date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")?,
            });
        }

        Ok(records)
    }
}

/// 目标表的建表语句，主键(symbol, date)保证每个交易日至多一行
fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         open float, \
         high float, \
         low float, \
         close float, \
         volume integer, \
         symbol varchar, \
         date date, \
         PRIMARY KEY (symbol, date))",
        table
    )
}

/// 逐条写入语句；重叠窗口按主键upsert，重复加载不会撞主键
fn insert_record_sql(table: &str) -> String {
    format!(
        "INSERT INTO {} (open, high, low, close, volume, date, symbol) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (symbol, date) DO UPDATE SET \
         open = excluded.open, \
         high = excluded.high, \
         low = excluded.low, \
         close = excluded.close, \
         volume = excluded.volume",
        table
    )
}

/// 表名无法参数化，拼接前校验字符集
/// 只允许字母数字、下划线和点（点用于带库名/模式名的表）
fn validate_table_ident(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table.split('.').all(|part| {
            !part.is_empty()
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !part.starts_with(|c: char| c.is_ascii_digit())
        });

    if valid {
        Ok(())
    } else {
        Err(PipelineError::ConfigError(format!(
            "invalid target table name: {:?}",
            table
        )))
    }
}

/// sqlite连接串指向文件时，确保父目录存在
fn ensure_sqlite_parent_dir(url: &str) -> Result<()> {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return Ok(());
    };

    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(())
}
