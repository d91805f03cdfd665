/// Organizing with paths relative to the working directory.
///
/// Kept in its own test binary because it changes the process working
/// directory, which would race with tests running in parallel.
use mediatidy::cli::organize_directory;
use mediatidy::config::OrganizerConfig;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn create_text_file(root: &Path, rel_path: &str, content: &str) {
    let path = root.join(rel_path);
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent directories");
    fs::write(&path, content).expect("Failed to write file");
}

#[test]
fn test_default_relative_library_is_stable_across_runs() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path();
    create_text_file(root, "organized_media/movies/Heat.1995.mkv", "film");
    create_text_file(root, "organized_media/movies/unorganized/Old.Stuff/clip.mp4", "raw");
    create_text_file(root, "Alien.1979.mkv", "film");
    std::env::set_current_dir(root).expect("Failed to enter temp directory");

    let config = OrganizerConfig::default();
    for _ in 0..2 {
        organize_directory(
            Path::new("."),
            &config.organization.output_directory,
            false,
            None,
            &config,
        )
        .expect("organize failed");
    }

    let library = root.join("organized_media").join("movies");
    assert!(library.join("Alien.1979.mkv").is_file());
    assert!(library.join("Heat.1995.mkv").is_file());
    assert!(library.join("unorganized/Old.Stuff/clip.mp4").is_file());
    assert!(!library.join("unorganized/unorganized").exists());
    assert!(!root.join("Alien.1979.mkv").exists());
}
