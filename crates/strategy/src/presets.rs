use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use common::{Error, TradingConfig};

/// Built-in trade setups. Each one is a complete trading block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradingPreset {
    Conservative,
    Moderate,
    Aggressive,
    Scalp,
}

impl TradingPreset {
    pub const ALL: [TradingPreset; 4] = [
        TradingPreset::Conservative,
        TradingPreset::Moderate,
        TradingPreset::Aggressive,
        TradingPreset::Scalp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TradingPreset::Conservative => "conservative",
            TradingPreset::Moderate => "moderate",
            TradingPreset::Aggressive => "aggressive",
            TradingPreset::Scalp => "scalp",
        }
    }

    pub fn config(&self) -> TradingConfig {
        match self {
            TradingPreset::Conservative => TradingConfig {
                entry_zone_min: Some(94_200.0),
                entry_zone_max: Some(94_500.0),
                stop_loss: 93_000.0,
                tp1: 95_500.0,
                tp2: None,
                tp3: None,
                min_conditions: 5,
                min_confidence: 75,
            },
            TradingPreset::Moderate => TradingConfig {
                entry_zone_min: Some(94_200.0),
                entry_zone_max: Some(94_500.0),
                stop_loss: 93_000.0,
                tp1: 95_800.0,
                tp2: Some(97_000.0),
                tp3: None,
                min_conditions: 4,
                min_confidence: 60,
            },
            TradingPreset::Aggressive => TradingConfig {
                entry_zone_min: Some(94_000.0),
                entry_zone_max: Some(94_800.0),
                stop_loss: 92_500.0,
                tp1: 96_500.0,
                tp2: Some(98_000.0),
                tp3: Some(100_000.0),
                min_conditions: 3,
                min_confidence: 50,
            },
            TradingPreset::Scalp => TradingConfig {
                entry_zone_min: Some(95_100.0),
                entry_zone_max: Some(95_300.0),
                stop_loss: 94_700.0,
                tp1: 96_200.0,
                tp2: None,
                tp3: None,
                min_conditions: 3,
                min_confidence: 50,
            },
        }
    }
}

impl fmt::Display for TradingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TradingPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                Error::Config(format!(
                    "unknown trading preset '{s}' (expected one of: conservative, moderate, aggressive, scalp)"
                ))
            })
    }
}

/// Named trading blocks loaded from TOML.
///
/// Example `config/presets.toml`:
/// ```toml
/// [preset.swing]
/// entry_zone_min = 92000.0
/// entry_zone_max = 93000.0
/// stop_loss = 90500.0
/// tp1 = 96000.0
/// min_conditions = 4
/// min_confidence = 65
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PresetFile {
    #[serde(rename = "preset", default)]
    pub presets: HashMap<String, TradingConfig>,
}

impl PresetFile {
    /// Load from a TOML file. Panics on a missing or malformed file.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read presets file at '{path}': {e}"));
        Self::from_toml_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse presets file at '{path}': {e}"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Look up a preset by name. File entries take precedence over built-ins
/// so a file can redefine e.g. `moderate`.
pub fn resolve_preset(name: &str, file: Option<&PresetFile>) -> common::Result<TradingConfig> {
    let key = name.trim().to_ascii_lowercase();
    if let Some(config) = file.and_then(|f| f.presets.get(&key)) {
        return Ok(config.clone());
    }
    key.parse::<TradingPreset>().map(|preset| preset.config())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_parse_case_insensitively() {
        assert_eq!(
            " Scalp ".parse::<TradingPreset>().unwrap(),
            TradingPreset::Scalp
        );
        assert!(matches!(
            "yolo".parse::<TradingPreset>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn conservative_is_stricter_than_aggressive() {
        let conservative = TradingPreset::Conservative.config();
        let aggressive = TradingPreset::Aggressive.config();
        assert!(conservative.min_conditions > aggressive.min_conditions);
        assert!(conservative.min_confidence > aggressive.min_confidence);
        assert_eq!(aggressive.tp3, Some(100_000.0));
        assert_eq!(conservative.tp2, None);
    }

    #[test]
    fn file_presets_override_builtins() {
        let file = PresetFile::from_toml_str(
            r#"
            [preset.moderate]
            entry_zone_min = 1.0
            entry_zone_max = 2.0
            stop_loss = 0.5
            tp1 = 3.0
            min_conditions = 2
            min_confidence = 10

            [preset.swing]
            stop_loss = 90500.0
            tp1 = 96000.0
            min_conditions = 4
            min_confidence = 65
            "#,
        )
        .unwrap();

        let moderate = resolve_preset("moderate", Some(&file)).unwrap();
        assert_eq!(moderate.tp1, 3.0);
        assert_eq!(moderate.tp2, None);

        // no zone in the file entry: the evaluator will derive one
        let swing = resolve_preset("swing", Some(&file)).unwrap();
        assert_eq!(swing.entry_zone(), None);

        let scalp = resolve_preset("scalp", Some(&file)).unwrap();
        assert_eq!(scalp, TradingPreset::Scalp.config());

        assert!(resolve_preset("swing", None).is_err());
    }
}
