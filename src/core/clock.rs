//! 时钟：为 prompt 提供当前时间标注

use chrono::{DateTime, Local, NaiveDateTime};

/// 当前时间的渲染格式
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub trait Clock: Send + Sync {
    /// 返回已渲染好的当前时间字符串
    fn now(&self) -> String;
}

/// 系统本地时间
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        let now: DateTime<Local> = Local::now();
        now.format(TIME_FORMAT).to_string()
    }
}

/// 固定时间（测试用）
#[derive(Debug, Clone)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.format(TIME_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_clock_format() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        assert_eq!(FixedClock(at).now(), "2024-03-09 07:05:00");
    }

    #[test]
    fn test_system_clock_parses_back() {
        let rendered = SystemClock.now();
        assert!(NaiveDateTime::parse_from_str(&rendered, TIME_FORMAT).is_ok());
    }
}
