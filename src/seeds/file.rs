use crate::SeedError;
use std::io::ErrorKind;
use std::path::Path;

/// Loads seed URLs from a text file
///
/// One URL per line. Surrounding whitespace is trimmed; blank lines and lines
/// starting with `#` are skipped. Lines are returned as written, without
/// normalization.
///
/// # Errors
///
/// * `SeedError::NotFound` - The file does not exist
/// * `SeedError::Io` - The file exists but could not be read
pub fn load_seeds(path: &Path) -> Result<Vec<String>, SeedError> {
    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SeedError::NotFound(path.display().to_string()),
        _ => SeedError::Io(e),
    })?;

    Ok(parse_seeds(&contents))
}

fn parse_seeds(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_seeds() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# seed list").unwrap();
        writeln!(file, "https://a.example/").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "   https://b.example/start  ").unwrap();
        writeln!(file, "   ").unwrap();
        writeln!(file, "#https://commented.example/").unwrap();
        file.flush().unwrap();

        let seeds = load_seeds(file.path()).unwrap();
        assert_eq!(
            seeds,
            vec!["https://a.example/", "https://b.example/start"]
        );
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(load_seeds(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-seeds.txt");

        match load_seeds(&path) {
            Err(SeedError::NotFound(p)) => assert!(p.contains("missing-seeds.txt")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_lines_are_not_normalized() {
        let seeds = parse_seeds("HTTPS://A.EXAMPLE/Path#frag\nnot a url\n");
        assert_eq!(seeds, vec!["HTTPS://A.EXAMPLE/Path#frag", "not a url"]);
    }

    #[test]
    fn test_windows_line_endings() {
        let seeds = parse_seeds("https://a.example/\r\n\r\nhttps://b.example/\r\n");
        assert_eq!(seeds, vec!["https://a.example/", "https://b.example/"]);
    }
}
