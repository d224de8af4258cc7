use serde::{Deserialize, Serialize};

/// Price tier relative to the current candidate pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Budget,
    Mid,
    Premium,
}

impl Tier {
    /// Ascending price order.
    pub const ALL: [Tier; 3] = [Tier::Budget, Tier::Mid, Tier::Premium];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Mid => "mid",
            Self::Premium => "premium",
        }
    }

    /// Next tier up the price ladder, `None` for premium.
    pub fn promoted(self) -> Option<Tier> {
        match self {
            Self::Budget => Some(Self::Mid),
            Self::Mid => Some(Self::Premium),
            Self::Premium => None,
        }
    }

    /// Final tie-break when two tiers have the same aggregate score and depth.
    /// Lower value wins: mid > premium > budget.
    pub fn tie_break_order(self) -> u8 {
        match self {
            Self::Mid => 0,
            Self::Premium => 1,
            Self::Budget => 2,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "budget" => Ok(Self::Budget),
            "mid" => Ok(Self::Mid),
            "premium" => Ok(Self::Premium),
            other => Err(format!("unknown tier `{other}` (expected budget|mid|premium)")),
        }
    }
}

/// One value per tier, serialized as `{premium, mid, budget}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TierMap<T> {
    pub premium: T,
    pub mid: T,
    pub budget: T,
}

impl<T> TierMap<T> {
    pub fn get(&self, tier: Tier) -> &T {
        match tier {
            Tier::Premium => &self.premium,
            Tier::Mid => &self.mid,
            Tier::Budget => &self.budget,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Tier) -> T) -> Self {
        Self { premium: f(Tier::Premium), mid: f(Tier::Mid), budget: f(Tier::Budget) }
    }
}

#[cfg(test)]
mod tests {
    use super::{Tier, TierMap};

    #[test]
    fn tie_break_prefers_mid_then_premium_then_budget() {
        let mut tiers = Tier::ALL.to_vec();
        tiers.sort_by_key(|tier| tier.tie_break_order());
        assert_eq!(tiers, vec![Tier::Mid, Tier::Premium, Tier::Budget]);
    }

    #[test]
    fn tier_map_serializes_with_stable_keys() {
        let map = TierMap { premium: 1_u32, mid: 2, budget: 3 };
        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"premium":1,"mid":2,"budget":3}"#);
        assert_eq!(*map.get(Tier::Mid), 2);
    }

    #[test]
    fn parses_tier_labels_case_insensitively() {
        assert_eq!("Premium".parse::<Tier>(), Ok(Tier::Premium));
        assert!("luxury".parse::<Tier>().is_err());
    }
}
