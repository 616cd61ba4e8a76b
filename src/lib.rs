/*!
 * # storyreel - short-form story videos from a single idea
 *
 * A Rust library that turns a one-line story idea into a narrated,
 * captioned vertical video.
 *
 * ## Features
 *
 * - Generate a twist-ending story script with a local LLM (Ollama)
 * - Narrate it with the OpenAI speech API
 * - Recover word-level timestamps with whisper_timestamped
 * - Group words into short centered captions and burn them onto background
 *   footage with ffmpeg, trimming video or audio so both line up
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Stage orchestrator (script, audio, timestamps, video)
 * - `providers`: External collaborators behind traits:
 *   - `providers::ollama`: Script generation
 *   - `providers::openai`: Text-to-speech
 *   - `providers::whisper`: Word timestamps
 * - `timing`: Timed-word model, caption grouping, timestamp report
 * - `media`: Clips, duration reconciliation, ffmpeg backend, video composer
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod media;
pub mod providers;
pub mod timing;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary, Stage, StageStatus};
pub use errors::{MediaError, PipelineError, ProviderError};
pub use media::{RenderReport, RenderRequest, VideoComposer};
pub use timing::{CaptionGrouper, CaptionUnit, Segment, TimedWord};
