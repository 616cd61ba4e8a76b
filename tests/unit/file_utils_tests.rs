/*!
 * Tests for file and directory utilities
 */

use std::path::PathBuf;

use storyreel::file_utils::FileManager;

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_ensure_dir_withNestedPath_shouldCreateAll() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let nested = temp_dir.path().join("output_videos/2026/october");

    FileManager::ensure_dir(&nested)?;
    assert!(FileManager::dir_exists(&nested));

    // Second call is a no-op
    FileManager::ensure_dir(&nested)?;
    Ok(())
}

#[test]
fn test_ensure_dir_withEmptyPath_shouldSucceed() {
    assert!(FileManager::ensure_dir("").is_ok());
}

#[test]
fn test_write_to_file_withNestedPath_shouldCreateParents() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = temp_dir.path().join("nested/script.txt");

    FileManager::write_to_file(&path, "I sold my brother's car.\nHe thanked me.")?;
    assert!(FileManager::file_exists(&path));
    assert_eq!(std::fs::read_to_string(&path)?, "I sold my brother's car.\nHe thanked me.");
    Ok(())
}

#[test]
fn test_timestamps_json_path_shouldSitNextToAudio() {
    assert_eq!(
        FileManager::timestamps_json_path("work/temp_story_audio.mp3"),
        PathBuf::from("work/temp_story_audio_timestamps.json")
    );
}

#[test]
fn test_is_video_file_shouldCheckExtension() {
    assert!(FileManager::is_video_file("clip.mp4"));
    assert!(FileManager::is_video_file("CLIP.MOV"));
    assert!(!FileManager::is_video_file("voice.mp3"));
    assert!(!FileManager::is_video_file("README"));
}

#[test]
fn test_find_videos_shouldRecurseAndSort() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    create_test_file(temp_dir.path(), "b.mp4", "v")?;
    create_test_file(temp_dir.path(), "a.webm", "v")?;
    create_test_file(temp_dir.path(), "deeper/c.mkv", "v")?;
    create_test_file(temp_dir.path(), "notes.txt", "not a video")?;

    let videos = FileManager::find_videos(temp_dir.path())?;
    let names: Vec<String> = videos
        .iter()
        .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.webm", "b.mp4", "deeper/c.mkv"]);
    Ok(())
}

#[test]
fn test_resolve_background_video_withFile_shouldReturnIt() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let video = create_test_file(temp_dir.path(), "parkour.mp4", "v")?;

    assert_eq!(FileManager::resolve_background_video(&video)?, video);
    Ok(())
}

#[test]
fn test_resolve_background_video_withDirectory_shouldPickOneOfItsVideos() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    let first = create_test_file(temp_dir.path(), "one.mp4", "v")?;
    let second = create_test_file(temp_dir.path(), "two.mov", "v")?;
    create_test_file(temp_dir.path(), "music.mp3", "a")?;

    for _ in 0..10 {
        let chosen = FileManager::resolve_background_video(temp_dir.path())?;
        assert!(chosen == first || chosen == second, "unexpected pick {:?}", chosen);
    }
    Ok(())
}

#[test]
fn test_resolve_background_video_withEmptyDirectory_shouldFail() -> anyhow::Result<()> {
    let temp_dir = create_temp_dir()?;
    create_test_file(temp_dir.path(), "readme.txt", "nothing here")?;

    assert!(FileManager::resolve_background_video(temp_dir.path()).is_err());
    assert!(FileManager::resolve_background_video(temp_dir.path().join("missing.mp4")).is_err());
    Ok(())
}
