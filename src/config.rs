use crate::defaults;
use crate::error::{RecogError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root engine configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub paths: PathsConfig,
    pub recognizer: RecognizerConfig,
    pub detector: DetectorConfig,
}

/// Filesystem layout for grammar artifacts and decoder models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory where per-channel grammar files are persisted.
    pub grammar_dir: PathBuf,
    /// Pronunciation dictionary handed to the decoder.
    pub dictionary: PathBuf,
    /// Acoustic model directory handed to the decoder.
    pub acoustic_model: PathBuf,
}

/// Per-utterance timing configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RecognizerConfig {
    pub noinput_timeout_ms: u64,
    pub recognition_timeout_ms: u64,
    pub partial_result_timeout_ms: u64,
    pub frame_time_ms: u64,
}

/// Activity detector configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Mean absolute amplitude above which a frame counts as activity.
    pub level_threshold: u32,
    /// Sustained activity needed to confirm start of speech (ms).
    pub speech_confirm_ms: u64,
    /// Sustained silence needed to confirm end of speech (ms).
    pub silence_confirm_ms: u64,
    /// Silence allowed before any speech at all (ms).
    pub noinput_timeout_ms: u64,
    /// Duration one frame contributes to the hysteresis counters (ms).
    pub frame_time_ms: u64,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            grammar_dir: PathBuf::from("grammars"),
            dictionary: PathBuf::from("models/default.dic"),
            acoustic_model: PathBuf::from("models/narrowband"),
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            noinput_timeout_ms: defaults::NOINPUT_TIMEOUT_MS,
            recognition_timeout_ms: defaults::RECOGNITION_TIMEOUT_MS,
            partial_result_timeout_ms: defaults::PARTIAL_RESULT_TIMEOUT_MS,
            frame_time_ms: defaults::FRAME_TIME_MS,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            level_threshold: defaults::DETECTOR_LEVEL_THRESHOLD,
            speech_confirm_ms: defaults::SPEECH_CONFIRM_MS,
            silence_confirm_ms: defaults::SILENCE_CONFIRM_MS,
            noinput_timeout_ms: defaults::NOINPUT_TIMEOUT_MS,
            frame_time_ms: defaults::FRAME_TIME_MS,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RecogError::ConfigFileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = EngineConfig::default();
        assert_eq!(config.recognizer.noinput_timeout_ms, 5000);
        assert_eq!(config.recognizer.recognition_timeout_ms, 15000);
        assert_eq!(config.recognizer.partial_result_timeout_ms, 100);
        assert_eq!(config.recognizer.frame_time_ms, 10);
        assert_eq!(config.detector.level_threshold, 50);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: EngineConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
            [recognizer]
            recognition_timeout_ms = 30000
        "#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.recognizer.recognition_timeout_ms, 30000);
        assert_eq!(config.recognizer.noinput_timeout_ms, 5000);
        assert_eq!(config.detector, DetectorConfig::default());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = EngineConfig::load(Path::new("/nonexistent/recog.toml"));
        assert!(matches!(
            result,
            Err(RecogError::ConfigFileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recog.toml");
        fs::write(
            &path,
            r#"
                [paths]
                grammar_dir = "/var/lib/recog/grammars"

                [detector]
                level_threshold = 120
            "#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(
            config.paths.grammar_dir,
            PathBuf::from("/var/lib/recog/grammars")
        );
        assert_eq!(config.detector.level_threshold, 120);
    }
}
