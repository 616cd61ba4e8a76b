//! Language code handling for the transcriber.
//!
//! whisper_timestamped selects its decoding language by ISO 639-1 code, while
//! users tend to type whatever code they know. These helpers accept 639-1,
//! 639-2/T and 639-2/B codes and reduce them to the two-letter form.

use anyhow::{Result, anyhow};
use isolang::Language;

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    let mapped = match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => return None,
    };
    Some(mapped)
}

/// Look up a language from any supported code form
fn lookup(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let part2t = bibliographic_to_terminology(&normalized).unwrap_or(&normalized);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Reduce a language code to the two-letter form the transcriber expects
pub fn transcription_language_code(code: &str) -> Result<String> {
    let language = lookup(code).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    language
        .to_639_1()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Language '{}' has no two-letter code and cannot be transcribed", code))
}

/// English name of the language behind a code
pub fn get_language_name(code: &str) -> Result<String> {
    lookup(code)
        .map(|language| language.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}
