use gaswatch_core::Band;
use gaswatch_notify::NotifyLevel;

/// 默认区间：LOW < 10 ≤ MEDIUM < 20 ≤ HIGH < 30 ≤ SUPER_HIGH（Gwei）
pub fn default_bands() -> Vec<Band> {
    vec![
        Band::new(
            "LOW",
            None,
            Some(10.0),
            "The cost of gas on the Ethereum network is low!",
        ),
        Band::new(
            "MEDIUM",
            Some(10.0),
            Some(20.0),
            "The cost of gas on the Ethereum network is medium!",
        ),
        Band::new(
            "HIGH",
            Some(20.0),
            Some(30.0),
            "The cost of gas on the Ethereum network is high!",
        )
        .with_level(NotifyLevel::Warning),
        Band::new(
            "SUPER_HIGH",
            Some(30.0),
            None,
            "The cost of gas on the Ethereum network is insane!",
        )
        .with_level(NotifyLevel::Critical),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaswatch_core::BandSet;

    #[test]
    fn test_default_bands_partition() {
        let set = BandSet::new(default_bands()).unwrap();
        assert_eq!(set.classify(5.0).unwrap().code, "LOW");
        assert_eq!(set.classify(45.0).unwrap().code, "SUPER_HIGH");
        assert!(set.bands().iter().all(|b| b.notify_enabled));
    }
}
