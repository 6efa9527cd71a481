use crate::error::{GasWatchError, Result};
use gaswatch_notify::NotifyLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_BODY_TEMPLATE: &str =
    "The current cost of gas on the Ethereum network is {value} Gwei.";

fn default_body_template() -> String {
    DEFAULT_BODY_TEMPLATE.to_string()
}

fn default_notify_enabled() -> bool {
    true
}

/// 价格区间 `[lower_bound, upper_bound)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// 区间编码，例如 `LOW`
    pub code: String,

    /// 下界（含），None 表示负无穷
    #[serde(default)]
    pub lower_bound: Option<f64>,

    /// 上界（不含），None 表示正无穷
    #[serde(default)]
    pub upper_bound: Option<f64>,

    /// 邮件主题
    pub subject: String,

    /// 正文模板，支持 `{value}` 和 `{code}`
    #[serde(default = "default_body_template")]
    pub body_template: String,

    /// 是否发送通知
    #[serde(default = "default_notify_enabled")]
    pub notify_enabled: bool,

    /// 通知级别
    #[serde(default)]
    pub level: NotifyLevel,
}

impl Band {
    pub fn new(
        code: impl Into<String>,
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            lower_bound,
            upper_bound,
            subject: subject.into(),
            body_template: default_body_template(),
            notify_enabled: true,
            level: NotifyLevel::Info,
        }
    }

    pub fn with_body_template(mut self, template: impl Into<String>) -> Self {
        self.body_template = template.into();
        self
    }

    pub fn with_level(mut self, level: NotifyLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_notify(mut self, enabled: bool) -> Self {
        self.notify_enabled = enabled;
        self
    }

    /// 数值是否落在本区间
    pub fn contains(&self, value: f64) -> bool {
        self.lower_bound.map_or(true, |lower| value >= lower)
            && self.upper_bound.map_or(true, |upper| value < upper)
    }
}

/// 按配置顺序查找第一个匹配的区间
pub fn classify(value: f64, bands: &[Band]) -> Result<&Band> {
    if !value.is_finite() {
        return Err(GasWatchError::Configuration(format!(
            "cannot classify non-finite value {}",
            value
        )));
    }

    bands
        .iter()
        .find(|band| band.contains(value))
        .ok_or_else(|| {
            GasWatchError::Configuration(format!("no band matches value {}", value))
        })
}

/// 启动时校验过的区间列表
#[derive(Debug, Clone, PartialEq)]
pub struct BandSet {
    bands: Vec<Band>,
}

impl BandSet {
    /// 校验区间覆盖整条数轴且互不重叠
    pub fn new(bands: Vec<Band>) -> Result<Self> {
        validate_partition(&bands)?;
        Ok(Self { bands })
    }

    /// 不做覆盖校验，分类失败留给每个周期报告
    pub fn unchecked(bands: Vec<Band>) -> Self {
        Self { bands }
    }

    pub fn classify(&self, value: f64) -> Result<&Band> {
        classify(value, &self.bands)
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

fn validate_partition(bands: &[Band]) -> Result<()> {
    if bands.is_empty() {
        return Err(GasWatchError::Configuration(
            "at least one band must be configured".to_string(),
        ));
    }

    let mut codes = HashSet::new();
    for band in bands {
        if band.code.is_empty() {
            return Err(GasWatchError::Configuration("band code must not be empty".to_string()));
        }
        if !codes.insert(band.code.as_str()) {
            return Err(GasWatchError::Configuration(format!(
                "duplicate band code {}",
                band.code
            )));
        }

        let finite = |bound: Option<f64>| bound.map_or(true, f64::is_finite);
        if !finite(band.lower_bound) || !finite(band.upper_bound) {
            return Err(GasWatchError::Configuration(format!(
                "band {} has a non-finite bound",
                band.code
            )));
        }

        if let (Some(lower), Some(upper)) = (band.lower_bound, band.upper_bound) {
            if lower >= upper {
                return Err(GasWatchError::Configuration(format!(
                    "band {} is empty: lower bound {} >= upper bound {}",
                    band.code, lower, upper
                )));
            }
        }
    }

    let mut sorted: Vec<&Band> = bands.iter().collect();
    sorted.sort_by(|a, b| {
        a.lower_bound
            .unwrap_or(f64::NEG_INFINITY)
            .total_cmp(&b.lower_bound.unwrap_or(f64::NEG_INFINITY))
    });

    if sorted[0].lower_bound.is_some() {
        return Err(GasWatchError::Configuration(format!(
            "values below {} are not covered by any band",
            sorted[0].lower_bound.unwrap_or_default()
        )));
    }

    for pair in sorted.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        match (current.upper_bound, next.lower_bound) {
            (Some(upper), Some(lower)) if upper == lower => {}
            (Some(upper), Some(lower)) if upper < lower => {
                return Err(GasWatchError::Configuration(format!(
                    "gap between bands {} and {}: [{}, {}) is not covered",
                    current.code, next.code, upper, lower
                )));
            }
            _ => {
                return Err(GasWatchError::Configuration(format!(
                    "bands {} and {} overlap",
                    current.code, next.code
                )));
            }
        }
    }

    let last = sorted[sorted.len() - 1];
    if let Some(upper) = last.upper_bound {
        return Err(GasWatchError::Configuration(format!(
            "values at or above {} are not covered by any band",
            upper
        )));
    }

    Ok(())
}
