//! Output naming and packaging

use std::path::Path;

pub mod archive;

/// File name for one segment: `<stem>_part_<NN>.<ext>`, 1-based, zero-padded
/// to at least two digits.
pub fn segment_file_name(stem: &str, index: usize, extension: &str) -> String {
    format!("{}_part_{:02}.{}", stem, index, extension)
}

/// Stem of the source file, used as the prefix for every part
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string())
}

/// Extension to carry over to the parts; stream copy keeps the container
pub fn source_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "mp4".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_segment_file_name_padding() {
        assert_eq!(segment_file_name("movie", 1, "mp4"), "movie_part_01.mp4");
        assert_eq!(segment_file_name("movie", 12, "mkv"), "movie_part_12.mkv");
        assert_eq!(segment_file_name("movie", 120, "mp4"), "movie_part_120.mp4");
    }

    #[test]
    fn test_source_stem_and_extension() {
        let path = PathBuf::from("/tmp/lecture.recording.mkv");
        assert_eq!(source_stem(&path), "lecture.recording");
        assert_eq!(source_extension(&path), "mkv");
    }

    #[test]
    fn test_source_extension_defaults_to_mp4() {
        let path = PathBuf::from("/tmp/raw_dump");
        assert_eq!(source_extension(&path), "mp4");
    }
}
