use crate::band::Band;
use gaswatch_notify::NotifyMessage;

/// 最近一次分类所在的区间，进程内存活，不持久化
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyState {
    last_band: Option<String>,
}

impl PolicyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// None 表示启动后尚未分类
    pub fn last_band(&self) -> Option<&str> {
        self.last_band.as_deref()
    }

    fn record(&mut self, code: &str) {
        if self.last_band.as_deref() != Some(code) {
            self.last_band = Some(code.to_string());
        }
    }
}

/// 一次通知决策
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub should_notify: bool,
    pub message: NotifyMessage,
}

/// 仅在进入一个启用通知的新区间时发送。
///
/// 无论是否发送，状态都会更新为当前区间，因此停留在禁用区间期间
/// 不会保留更早的启用区间。
pub fn decide(band: &Band, value: f64, state: &mut PolicyState) -> Decision {
    let should_notify = band.notify_enabled && state.last_band() != Some(band.code.as_str());
    let message = render_message(band, value);

    state.record(&band.code);

    Decision {
        should_notify,
        message,
    }
}

/// 用当前数值渲染区间的主题和正文
pub fn render_message(band: &Band, value: f64) -> NotifyMessage {
    let render = |template: &str| {
        template
            .replace("{value}", &value.to_string())
            .replace("{code}", &band.code)
    };

    NotifyMessage::new(render(&band.subject), render(&band.body_template), band.level)
        .with_metadata(serde_json::json!({
            "band": band.code,
            "value": value,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaswatch_notify::NotifyLevel;
    use proptest::prelude::*;

    fn bands() -> Vec<Band> {
        vec![
            Band::new("LOW", None, Some(10.0), "The cost of gas is low!"),
            Band::new("MEDIUM", Some(10.0), Some(20.0), "The cost of gas is medium!")
                .with_notify(false),
            Band::new("HIGH", Some(20.0), None, "{code}: {value} Gwei")
                .with_level(NotifyLevel::Critical),
        ]
    }

    #[test]
    fn test_first_decision_always_notifies_enabled_band() {
        let mut state = PolicyState::new();
        assert_eq!(state.last_band(), None);

        let decision = decide(&bands()[0], 5.0, &mut state);
        assert!(decision.should_notify);
        assert_eq!(state.last_band(), Some("LOW"));
    }

    #[test]
    fn test_same_band_is_not_renotified() {
        let mut state = PolicyState::new();
        let low = &bands()[0];
        assert!(decide(low, 5.0, &mut state).should_notify);
        assert!(!decide(low, 7.0, &mut state).should_notify);
        assert!(!decide(low, 9.5, &mut state).should_notify);
    }

    #[test]
    fn test_disabled_band_still_updates_state() {
        let bands = bands();
        let mut state = PolicyState::new();

        assert!(decide(&bands[0], 5.0, &mut state).should_notify);
        assert!(!decide(&bands[1], 15.0, &mut state).should_notify);
        assert_eq!(state.last_band(), Some("MEDIUM"));

        // 离开禁用区间回到 LOW 视为新的切换
        assert!(decide(&bands[0], 5.0, &mut state).should_notify);
    }

    #[test]
    fn test_message_reflects_current_value_even_when_skipped() {
        let low = &bands()[0];
        let mut state = PolicyState::new();
        decide(low, 5.0, &mut state);

        let decision = decide(low, 7.25, &mut state);
        assert!(!decision.should_notify);
        assert_eq!(decision.message.title, "The cost of gas is low!");
        assert_eq!(
            decision.message.content,
            "The current cost of gas on the Ethereum network is 7.25 Gwei."
        );
    }

    #[test]
    fn test_render_placeholders_and_level() {
        let message = render_message(&bands()[2], 45.0);
        assert_eq!(message.title, "HIGH: 45 Gwei");
        assert_eq!(message.level, NotifyLevel::Critical);
        assert_eq!(message.metadata.unwrap()["band"], "HIGH");
    }

    proptest! {
        #[test]
        fn prop_notifies_only_on_enabled_transitions(
            values in proptest::collection::vec(-50.0f64..50.0, 1..40)
        ) {
            let bands = bands();
            let mut state = PolicyState::new();
            let mut previous: Option<String> = None;

            for value in values {
                let band = crate::band::classify(value, &bands).unwrap();
                let decision = decide(band, value, &mut state);

                let expected = band.notify_enabled && previous.as_deref() != Some(band.code.as_str());
                prop_assert_eq!(decision.should_notify, expected);
                prop_assert_eq!(state.last_band(), Some(band.code.as_str()));
                previous = Some(band.code.clone());
            }
        }
    }
}
