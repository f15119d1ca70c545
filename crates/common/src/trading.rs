use serde::{Deserialize, Serialize};

use crate::EntryZone;

/// Trade setup the evaluator and assembler read. Loaded once at startup
/// and only ever replaced wholesale (e.g. by a named preset).
///
/// Example preset table:
/// ```toml
/// entry_zone_min = 94200.0
/// entry_zone_max = 94500.0
/// stop_loss = 93000.0
/// tp1 = 95800.0
/// tp2 = 97000.0
/// min_conditions = 4
/// min_confidence = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Lower entry bound. When either bound is missing the zone is derived
    /// from the Fibonacci band of the recent swing.
    #[serde(default)]
    pub entry_zone_min: Option<f64>,
    #[serde(default)]
    pub entry_zone_max: Option<f64>,
    pub stop_loss: f64,
    pub tp1: f64,
    #[serde(default)]
    pub tp2: Option<f64>,
    #[serde(default)]
    pub tp3: Option<f64>,
    pub min_conditions: usize,
    pub min_confidence: u32,
}

impl TradingConfig {
    pub fn entry_zone(&self) -> Option<EntryZone> {
        match (self.entry_zone_min, self.entry_zone_max) {
            (Some(min), Some(max)) => Some(EntryZone::new(min, max)),
            _ => None,
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            entry_zone_min: Some(94_200.0),
            entry_zone_max: Some(94_500.0),
            stop_loss: 93_000.0,
            tp1: 95_800.0,
            tp2: Some(97_000.0),
            tp3: Some(98_500.0),
            min_conditions: 4,
            min_confidence: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_zone_requires_both_bounds() {
        let mut cfg = TradingConfig::default();
        assert_eq!(cfg.entry_zone(), Some(EntryZone::new(94_200.0, 94_500.0)));
        cfg.entry_zone_max = None;
        assert_eq!(cfg.entry_zone(), None);
    }
}
