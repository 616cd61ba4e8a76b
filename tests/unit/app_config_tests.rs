/*!
 * Tests for application configuration
 */

use std::path::PathBuf;
use std::str::FromStr;

use storyreel::app_config::{Config, LogLevel, ScriptProvider};

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_default_config_shouldValidate() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.script.provider, ScriptProvider::Ollama);
    assert_eq!(config.speech.model, "tts-1");
    assert_eq!(config.video.video_codec, "libx264");
    assert_eq!(config.video.audio_codec, "aac");
    assert_eq!(config.captions.font_size, 35);
    assert_eq!(config.captions.min_duration, 0.5);
}

#[test]
fn test_config_serialization_shouldRoundTripThroughFile() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let mut config = Config::default();
    config.script.model = "llama3".to_string();
    config.video.background_video = PathBuf::from("clips");

    let path = create_test_file(temp_dir.path(), "conf.json", &serde_json::to_string_pretty(&config)?)?;
    let loaded: Config = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    assert_eq!(loaded.script.model, "llama3");
    assert_eq!(loaded.video.background_video, PathBuf::from("clips"));
    assert_eq!(loaded.speech.voice, config.speech.voice);
    Ok(())
}

#[test]
fn test_empty_json_shouldYieldDefaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.script.model, "mistral");
    assert_eq!(config.transcription.command, "whisper_timestamped");
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_validate_withBadTemperature_shouldFail() {
    let mut config = Config::default();
    config.script.temperature = Some(2.5);
    assert!(config.validate().is_err());

    config.script.temperature = Some(0.7);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withZeroGroupSize_shouldFail() {
    let mut config = Config::default();
    config.captions.group_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withNegativeMinDuration_shouldFail() {
    let mut config = Config::default();
    config.captions.min_duration = -0.1;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withThreeLetterLanguage_shouldPass() {
    let mut config = Config::default();
    config.transcription.language = "fre".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withEmptyOutputFilename_shouldFail() {
    let mut config = Config::default();
    config.video.output_filename = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_script_provider_fromStr_shouldParseCaseInsensitively() {
    assert_eq!(ScriptProvider::from_str("ollama").unwrap(), ScriptProvider::Ollama);
    assert_eq!(ScriptProvider::from_str("Ollama").unwrap(), ScriptProvider::Ollama);
    assert!(ScriptProvider::from_str("gpt").is_err());
    assert_eq!(ScriptProvider::Ollama.to_string(), "ollama");
}

#[test]
fn test_log_level_shouldMapToFilter() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}

#[test]
fn test_get_api_key_withConfiguredKey_shouldPreferIt() {
    let mut config = Config::default();
    config.speech.api_key = "sk-configured".to_string();
    assert_eq!(config.speech.get_api_key(), "sk-configured");
}
