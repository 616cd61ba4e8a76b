/*!
 * Tests for language utilities
 */

use storyreel::language_utils::{get_language_name, transcription_language_code};

#[test]
fn test_transcription_language_code_withTwoLetterCode_shouldReturnIt() {
    assert_eq!(transcription_language_code("es").unwrap(), "es");
    assert_eq!(transcription_language_code("JA").unwrap(), "ja");
}

#[test]
fn test_transcription_language_code_withBibliographicCodes_shouldMapToTwoLetters() {
    assert_eq!(transcription_language_code("dut").unwrap(), "nl");
    assert_eq!(transcription_language_code("chi").unwrap(), "zh");
    assert_eq!(transcription_language_code("per").unwrap(), "fa");
}

#[test]
fn test_transcription_language_code_withInvalidInput_shouldFail() {
    assert!(transcription_language_code("").is_err());
    assert!(transcription_language_code("q").is_err());
    assert!(transcription_language_code("qqq").is_err());
}

#[test]
fn test_get_language_name_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("ger").unwrap(), "German");
    assert!(get_language_name("xx").is_err());
}
