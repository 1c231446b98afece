use core::{cmp::Ordering, fmt};

const LOG_LEVEL_NAMES: [&str; 6] = ["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"];

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Level {
    Error = 1,
    Warn,
    Info,
    Debug,
    Trace,
}

impl PartialEq<LevelFilter> for Level {
    #[inline]
    fn eq(&self, other: &LevelFilter) -> bool {
        *self as u8 == *other as u8
    }
}

impl PartialOrd<LevelFilter> for Level {
    #[inline]
    fn partial_cmp(&self, other: &LevelFilter) -> Option<Ordering> {
        (*self as u8).partial_cmp(&(*other as u8))
    }
}

impl fmt::Display for Level {
    #[inline]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.pad(self.as_str())
    }
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        LOG_LEVEL_NAMES[*self as usize]
    }
}

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum LevelFilter {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl PartialEq<Level> for LevelFilter {
    #[inline]
    fn eq(&self, other: &Level) -> bool {
        other.eq(self)
    }
}

impl PartialOrd<Level> for LevelFilter {
    #[inline]
    fn partial_cmp(&self, other: &Level) -> Option<Ordering> {
        (*self as u8).partial_cmp(&(*other as u8))
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.pad(self.as_str())
    }
}

impl LevelFilter {
    pub const fn as_str(&self) -> &'static str {
        LOG_LEVEL_NAMES[*self as usize]
    }
}

/// 控制台日志等级，编译期由环境变量 `KERNEL_CLOG` 决定，默认关闭
pub const CLOG: LevelFilter = decide_log_level(option_env!("KERNEL_CLOG"));

const fn decide_log_level(level_str: Option<&str>) -> LevelFilter {
    // const fn 里没法直接比较 `&str`，只能逐字节比
    const fn str_eq(lhs: &str, rhs: &str) -> bool {
        let (lhs, rhs) = (lhs.as_bytes(), rhs.as_bytes());
        if lhs.len() != rhs.len() {
            return false;
        }
        let mut i = 0;
        while i < lhs.len() {
            if lhs[i] != rhs[i] {
                return false;
            }
            i += 1;
        }
        true
    }

    const FILTERS: [LevelFilter; 5] = [
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];

    let Some(level_str) = level_str else {
        return LevelFilter::Off;
    };
    let mut i = 0;
    while i < FILTERS.len() {
        if str_eq(level_str, FILTERS[i].as_str()) {
            return FILTERS[i];
        }
        i += 1;
    }
    LevelFilter::Off
}

#[cfg(test)]
mod tests {
    use super::{decide_log_level, Level, LevelFilter};

    #[test]
    fn level_compares_with_filter() {
        assert!(Level::Error <= LevelFilter::Warn);
        assert!(Level::Trace > LevelFilter::Debug);
        assert!(Level::Error > LevelFilter::Off);
    }

    #[test]
    fn parse_level_from_env() {
        assert_eq!(decide_log_level(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(decide_log_level(Some("debug")), LevelFilter::Off);
        assert_eq!(decide_log_level(None), LevelFilter::Off);
    }
}
