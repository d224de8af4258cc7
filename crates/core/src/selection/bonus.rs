use crate::config::MentionBonusConfig;

/// Bounded, monotonic bonus from external mention counts.
///
/// `max_bonus * m / (m + half_saturation)`: zero mentions give zero, the
/// bonus reaches half of `max_bonus` at `half_saturation` mentions and never
/// exceeds `max_bonus`. It only reorders products inside the winning tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MentionBonus {
    max_bonus: f64,
    half_saturation: f64,
}

impl Default for MentionBonus {
    fn default() -> Self {
        Self { max_bonus: 0.10, half_saturation: 5.0 }
    }
}

impl From<MentionBonusConfig> for MentionBonus {
    fn from(config: MentionBonusConfig) -> Self {
        Self { max_bonus: config.max_bonus, half_saturation: config.half_saturation }
    }
}

impl MentionBonus {
    pub fn for_mentions(&self, mentions: u32) -> f64 {
        if mentions == 0 || self.max_bonus <= 0.0 {
            return 0.0;
        }
        let m = f64::from(mentions);
        self.max_bonus * m / (m + self.half_saturation)
    }
}

#[cfg(test)]
mod tests {
    use super::MentionBonus;

    #[test]
    fn zero_mentions_add_nothing() {
        assert_eq!(MentionBonus::default().for_mentions(0), 0.0);
    }

    #[test]
    fn half_saturation_gives_half_the_maximum() {
        assert!((MentionBonus::default().for_mentions(5) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn bonus_is_monotonic_and_bounded() {
        let bonus = MentionBonus::default();
        let mut previous = 0.0;
        for mentions in [1, 2, 10, 100, 10_000, u32::MAX] {
            let value = bonus.for_mentions(mentions);
            assert!(value > previous);
            assert!(value < 0.10);
            previous = value;
        }
    }
}
