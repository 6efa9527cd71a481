use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 通知级别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    /// 信息
    #[default]
    Info,
    /// 警告
    Warning,
    /// 错误
    Error,
    /// 严重
    Critical,
}

/// 通知消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyMessage {
    /// 标题（邮件主题）
    pub title: String,

    /// 内容（邮件正文）
    pub content: String,

    /// 级别
    pub level: NotifyLevel,

    /// 时间
    pub timestamp: DateTime<Utc>,

    /// 额外数据
    pub metadata: Option<serde_json::Value>,
}

impl NotifyMessage {
    pub fn new(title: impl Into<String>, content: impl Into<String>, level: NotifyLevel) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            level,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// 创建信息级别消息
    pub fn info(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(title, content, NotifyLevel::Info)
    }

    /// 创建警告级别消息
    pub fn warning(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(title, content, NotifyLevel::Warning)
    }

    /// 创建错误级别消息
    pub fn error(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(title, content, NotifyLevel::Error)
    }

    /// 创建严重级别消息
    pub fn critical(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(title, content, NotifyLevel::Critical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_constructors() {
        assert_eq!(NotifyMessage::info("a", "b").level, NotifyLevel::Info);
        assert_eq!(NotifyMessage::critical("a", "b").level, NotifyLevel::Critical);
    }

    #[test]
    fn test_level_serde_lowercase() {
        let level: NotifyLevel = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(level, NotifyLevel::Warning);
        assert_eq!(serde_json::to_string(&NotifyLevel::Critical).unwrap(), "\"critical\"");
    }

    #[test]
    fn test_with_metadata() {
        let msg = NotifyMessage::warning("Gas", "high")
            .with_metadata(serde_json::json!({ "band": "HIGH" }));
        assert_eq!(msg.metadata.unwrap()["band"], "HIGH");
    }
}
