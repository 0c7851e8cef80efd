use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::voice::RecognizerLanguage;

pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/holdgate.toml");

pub const DEFAULT_LONG_PRESS_DELAY_MS: u64 = 1_500;
pub const DEFAULT_MOVEMENT_THRESHOLD_PX: u16 = 10;
pub const DEFAULT_SECOND_FINGER_GRACE_MS: u64 = 80;
pub const DEFAULT_LATE_RESULT_GRACE_MS: u64 = 3_000;
const BLUR_INTENSITY_MAX: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub long_press_delay_ms: u64,
    /// Applies to the single contact and to the two-contact centroid alike.
    pub movement_threshold_px: u16,
    pub second_finger_grace_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_delay_ms: DEFAULT_LONG_PRESS_DELAY_MS,
            movement_threshold_px: DEFAULT_MOVEMENT_THRESHOLD_PX,
            second_finger_grace_ms: DEFAULT_SECOND_FINGER_GRACE_MS,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.second_finger_grace_ms == 0 {
            return Err(ConfigError::Invalid(
                "gesture.second_finger_grace_ms must be > 0",
            ));
        }
        // The single-press timer waits the difference after disambiguation.
        if self.long_press_delay_ms <= self.second_finger_grace_ms {
            return Err(ConfigError::Invalid(
                "gesture.long_press_delay_ms must be > gesture.second_finger_grace_ms",
            ));
        }
        if self.movement_threshold_px == 0 {
            return Err(ConfigError::Invalid(
                "gesture.movement_threshold_px must be > 0",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoiceConfig {
    pub enabled: bool,
    pub late_result_grace_ms: u64,
    pub language: RecognizerLanguage,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            late_result_grace_ms: DEFAULT_LATE_RESULT_GRACE_MS,
            language: RecognizerLanguage::default(),
        }
    }
}

/// Passed through to whichever menu renderer the presentation layer uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MenuConfig {
    pub blur_intensity: u8,
    pub dismiss_margin_px: u16,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            blur_intensity: 60,
            dismiss_margin_px: 24,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedbackConfig {
    pub haptics_enabled: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            haptics_enabled: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HoldgateConfig {
    pub gesture: GestureConfig,
    pub voice: VoiceConfig,
    pub menu: MenuConfig,
    pub feedback: FeedbackConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(reason) => f.write_str(reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err)
    }
}

pub fn parse_config(text: &str) -> Result<HoldgateConfig, ConfigError> {
    let config: HoldgateConfig = toml::from_str(text)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<HoldgateConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

pub fn validate_config(config: &HoldgateConfig) -> Result<(), ConfigError> {
    config.gesture.validate()?;
    if config.voice.late_result_grace_ms == 0 {
        return Err(ConfigError::Invalid(
            "voice.late_result_grace_ms must be > 0",
        ));
    }
    if config.menu.blur_intensity > BLUR_INTENSITY_MAX {
        return Err(ConfigError::Invalid("menu.blur_intensity must be <= 100"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_defaults() {
        let parsed = parse_config(DEFAULT_CONFIG_TOML).expect("bundled config should parse");
        assert_eq!(parsed, HoldgateConfig::default());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed = parse_config("[gesture]\nlong_press_delay_ms = 900\n").unwrap();
        assert_eq!(parsed.gesture.long_press_delay_ms, 900);
        assert_eq!(
            parsed.gesture.movement_threshold_px,
            DEFAULT_MOVEMENT_THRESHOLD_PX
        );
        assert_eq!(parsed.voice, VoiceConfig::default());
    }

    #[test]
    fn language_codes_parse() {
        let parsed = parse_config("[voice]\nlanguage = \"de-DE\"\nenabled = false\n").unwrap();
        assert_eq!(parsed.voice.language, RecognizerLanguage::German);
        assert!(!parsed.voice.enabled);
    }

    #[test]
    fn semantic_validation_names_the_field() {
        let cases = [
            (
                "[gesture]\nlong_press_delay_ms = 80\nsecond_finger_grace_ms = 80\n",
                "gesture.long_press_delay_ms must be > gesture.second_finger_grace_ms",
            ),
            (
                "[gesture]\nsecond_finger_grace_ms = 0\n",
                "gesture.second_finger_grace_ms must be > 0",
            ),
            (
                "[gesture]\nmovement_threshold_px = 0\n",
                "gesture.movement_threshold_px must be > 0",
            ),
            (
                "[voice]\nlate_result_grace_ms = 0\n",
                "voice.late_result_grace_ms must be > 0",
            ),
            (
                "[menu]\nblur_intensity = 101\n",
                "menu.blur_intensity must be <= 100",
            ),
        ];

        for (text, expected) in cases {
            let err = parse_config(text).expect_err("config should be rejected");
            assert_eq!(err.to_string(), expected, "input: {text}");
        }
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = parse_config("[gesture]\nlong_press = 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_language_is_a_parse_error() {
        let err = parse_config("[voice]\nlanguage = \"it-IT\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/holdgate.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/holdgate.toml"));
    }
}
