// ==========================================
// 工厂管理系统 - 请求字段校验器
// ==========================================
// 职责: 收集字段级违规，一次性返回 ValidationFailed
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::str::FromStr;

use crate::api::error::{ApiError, ApiResult, FieldViolation};

/// 可接受的无时区时间格式（按 UTC 解释）
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// 解析时间字符串
///
/// 支持 RFC 3339；不带时区的格式按 UTC 解释；纯日期取当天 00:00 UTC
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .map(|naive| naive.and_utc())
}

// ==========================================
// FieldValidator - 字段校验器
// ==========================================
#[derive(Debug, Default)]
pub struct FieldValidator {
    violations: Vec<FieldViolation>,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation::new(field, message));
    }

    /// cond 为 false 时记录违规
    pub fn check(&mut self, cond: bool, field: &str, message: &str) {
        if !cond {
            self.push(field, message);
        }
    }

    /// 必填字符串（去除首尾空白后非空）
    pub fn required_str(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.push(field, "不能为空");
                None
            }
        }
    }

    /// 可选字符串：空白视为未提供
    pub fn optional_str(value: Option<&str>) -> Option<String> {
        value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
    }

    /// 必填整数，且不小于 min
    pub fn required_int(&mut self, field: &str, value: Option<i64>, min: i64) -> Option<i64> {
        match value {
            None => {
                self.push(field, "不能为空");
                None
            }
            Some(v) if v < min => {
                self.push(field, format!("不能小于{}", min));
                None
            }
            Some(v) => Some(v),
        }
    }

    /// 必填时间
    pub fn required_datetime(&mut self, field: &str, value: Option<&str>) -> Option<DateTime<Utc>> {
        let raw = self.required_str(field, value)?;
        let parsed = parse_datetime(&raw);
        if parsed.is_none() {
            self.push(field, format!("无法解析的时间: {}", raw));
        }
        parsed
    }

    /// 可选时间：提供了但无法解析时记录违规
    pub fn optional_datetime(&mut self, field: &str, value: Option<&str>) -> Option<DateTime<Utc>> {
        let raw = Self::optional_str(value)?;
        let parsed = parse_datetime(&raw);
        if parsed.is_none() {
            self.push(field, format!("无法解析的时间: {}", raw));
        }
        parsed
    }

    /// 可选枚举：提供了但不是合法取值时记录违规
    pub fn optional_enum<T>(&mut self, field: &str, value: Option<&str>) -> Option<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = Self::optional_str(value)?;
        match raw.parse::<T>() {
            Ok(v) => Some(v),
            Err(e) => {
                self.push(field, e.to_string());
                None
            }
        }
    }

    /// 结束校验
    pub fn finish(self) -> ApiResult<()> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationFailed {
                violations: self.violations,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::EquipmentStatus;
    use chrono::TimeZone;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap();
        assert_eq!(parse_datetime("2026-03-01T08:30:00Z"), Some(expected));
        assert_eq!(parse_datetime("2026-03-01T16:30:00+08:00"), Some(expected));
        assert_eq!(parse_datetime("2026-03-01T08:30"), Some(expected));
        assert_eq!(parse_datetime("2026-03-01 08:30:00"), Some(expected));
        assert_eq!(
            parse_datetime("2026-03-01"),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_datetime("下周一"), None);
    }

    #[test]
    fn test_collects_all_violations() {
        let mut v = FieldValidator::new();
        assert_eq!(v.required_str("name", Some("  ")), None);
        assert_eq!(v.required_int("quantity", Some(0), 1), None);
        assert_eq!(v.required_datetime("startTime", Some("abc")), None);
        assert_eq!(v.optional_enum::<EquipmentStatus>("status", Some("BROKEN")), None);

        match v.finish() {
            Err(ApiError::ValidationFailed { violations }) => {
                let fields: Vec<_> = violations.iter().map(|x| x.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "quantity", "startTime", "status"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        let mut v = FieldValidator::new();
        assert_eq!(v.required_str("name", Some(" 压力机 ")).as_deref(), Some("压力机"));
        assert_eq!(v.required_int("quantity", Some(5), 1), Some(5));
        assert_eq!(v.optional_datetime("checkDate", None), None);
        assert!(v.finish().is_ok());
    }
}
