use std::time::Duration;
use thiserror::Error;

/// 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GasWatchError {
    /// 价格源不可达或返回了无法解析的数据
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// 区间配置无法对数值做出分类
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 通知发送失败
    #[error("Notify error: {0}")]
    Notify(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl GasWatchError {
    /// 下一个周期可能自行恢复的错误
    pub fn is_transient(&self) -> bool {
        !matches!(self, GasWatchError::Configuration(_))
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, GasWatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GasWatchError::Fetch("down".into()).is_transient());
        assert!(GasWatchError::Notify("smtp".into()).is_transient());
        assert!(!GasWatchError::Configuration("gap".into()).is_transient());
    }

    #[test]
    fn test_timeout_display() {
        let err = GasWatchError::Timeout {
            operation: "fetch",
            after: Duration::from_secs(15),
        };
        assert_eq!(err.to_string(), "fetch timed out after 15s");
    }
}
