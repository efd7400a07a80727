//! 时间工具函数 — 业务时区转换
//!
//! 存储层只使用 `i64` Unix millis；`fecha_entrega_estimada` 是纯日期
//! 字符串 (YYYY-MM-DD)，在 API 层验证格式。本地化格式只用于展示
//! (票据、日志)。

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Unix millis → 业务时区的展示格式 (DD/MM/YYYY HH:MM)
pub fn millis_to_local(millis: i64, tz: Tz) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.with_timezone(&tz).format("%d/%m/%Y %H:%M").to_string(),
        None => format!("{millis}"),
    }
}
