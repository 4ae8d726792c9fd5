//! Process-wide policy toggles.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// A gateway policy that can be switched on and off at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureFlag {
    /// Fixed-window request quota.
    ResourceQuotas,
    /// Bounded in-flight upstream calls.
    Concurrency,
    /// Response caching.
    Efficiency,
    /// Periodic forced upstream delay.
    Timeouts,
    /// Address character-class check.
    InputValidation,
}

impl FeatureFlag {
    pub const ALL: [FeatureFlag; 5] = [
        FeatureFlag::ResourceQuotas,
        FeatureFlag::Concurrency,
        FeatureFlag::Efficiency,
        FeatureFlag::Timeouts,
        FeatureFlag::InputValidation,
    ];

    /// Wire name used by the control plane.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlag::ResourceQuotas => "resourceQuotas",
            FeatureFlag::Concurrency => "concurrency",
            FeatureFlag::Efficiency => "efficiency",
            FeatureFlag::Timeouts => "timeouts",
            FeatureFlag::InputValidation => "inputValidation",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a name is not one of the known flags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature flag: {0}")]
pub struct UnknownFlag(pub String);

impl FromStr for FeatureFlag {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureFlag::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| UnknownFlag(s.to_string()))
    }
}

/// Registry of policy flags shared by every in-flight request.
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    flags: [AtomicBool; 5],
}

impl FeatureRegistry {
    /// Create a registry with every flag disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from an initial flag table.
    pub fn with_flags(initial: impl IntoIterator<Item = (FeatureFlag, bool)>) -> Self {
        let registry = Self::new();
        for (flag, enabled) in initial {
            registry.set_flag(flag, enabled);
        }
        registry
    }

    /// Set a flag by wire name. Returns false if the name is unknown.
    pub fn set(&self, name: &str, enabled: bool) -> bool {
        match name.parse::<FeatureFlag>() {
            Ok(flag) => {
                self.set_flag(flag, enabled);
                true
            }
            Err(_) => false,
        }
    }

    /// Check a flag by wire name. Unknown names read as disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        name.parse::<FeatureFlag>()
            .map(|flag| self.is_flag_enabled(flag))
            .unwrap_or(false)
    }

    /// Set a flag, returning its previous value.
    pub fn set_flag(&self, flag: FeatureFlag, enabled: bool) -> bool {
        self.flags[flag.index()].swap(enabled, Ordering::SeqCst)
    }

    pub fn is_flag_enabled(&self, flag: FeatureFlag) -> bool {
        self.flags[flag.index()].load(Ordering::SeqCst)
    }

    /// Snapshot of all known flags.
    pub fn list(&self) -> BTreeMap<FeatureFlag, bool> {
        FeatureFlag::ALL
            .into_iter()
            .map(|flag| (flag, self.is_flag_enabled(flag)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_flags_start_disabled() {
        let registry = FeatureRegistry::new();
        let flags = registry.list();
        assert_eq!(flags.len(), 5);
        assert!(flags.values().all(|enabled| !enabled));
    }

    #[test]
    fn test_set_and_get_by_name() {
        let registry = FeatureRegistry::new();
        assert!(registry.set("efficiency", true));
        assert!(registry.is_enabled("efficiency"));
        assert!(registry.is_flag_enabled(FeatureFlag::Efficiency));
        assert!(!registry.is_enabled("timeouts"));

        assert!(registry.set("efficiency", false));
        assert!(!registry.is_enabled("efficiency"));
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let registry = FeatureRegistry::new();
        assert!(!registry.set("turbo", true));
        assert!(!registry.is_enabled("turbo"));
        assert_eq!(registry.list().len(), 5);
        assert!(!registry.set("Efficiency", true), "names are case sensitive");
    }

    #[test]
    fn test_initial_table() {
        let registry = FeatureRegistry::with_flags([(FeatureFlag::Concurrency, true)]);
        assert!(registry.is_flag_enabled(FeatureFlag::Concurrency));
        assert!(!registry.is_flag_enabled(FeatureFlag::ResourceQuotas));
    }

    #[test]
    fn test_wire_names_round_trip() {
        for flag in FeatureFlag::ALL {
            assert_eq!(flag.as_str().parse::<FeatureFlag>().unwrap(), flag);
            let json = serde_json::to_string(&flag).unwrap();
            assert_eq!(json, format!("\"{}\"", flag.as_str()));
        }
    }
}
