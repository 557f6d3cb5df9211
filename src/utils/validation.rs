//! Centralized path and input helpers.

use std::collections::HashSet;
use std::path::Path;

/// Compression suffixes recognized on input and output paths
pub const COMPRESSED_SUFFIXES: [&str; 2] = [".gz", ".bgz"];

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
#[must_use]
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    COMPRESSED_SUFFIXES
        .iter()
        .any(|suffix| path_str.ends_with(suffix))
}

/// Derive a sample column name from a report path.
///
/// The name is the file's base name with one trailing compression suffix
/// removed.
///
/// # Examples
///
/// ```
/// use array_vcf::utils::validation::sample_name_from_path;
/// use std::path::Path;
///
/// assert_eq!(sample_name_from_path(Path::new("/data/NA12878.txt.gz")), "NA12878.txt");
/// assert_eq!(sample_name_from_path(Path::new("NA12891.txt")), "NA12891.txt");
/// ```
#[must_use]
pub fn sample_name_from_path(path: &Path) -> String {
    let base = path
        .file_name()
        .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy())
        .to_string();

    for suffix in COMPRESSED_SUFFIXES {
        if base.len() <= suffix.len() {
            continue;
        }
        let split = base.len() - suffix.len();
        if let (Some(stem), Some(tail)) = (base.get(..split), base.get(split..)) {
            if tail.eq_ignore_ascii_case(suffix) {
                return stem.to_string();
            }
        }
    }
    base
}

/// Return the first sample name that occurs more than once, if any
#[must_use]
pub fn find_duplicate_name(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_gzipped() {
        assert!(is_gzipped(Path::new("report.txt.gz")));
        assert!(is_gzipped(Path::new("ref.fa.BGZ")));
        assert!(!is_gzipped(Path::new("report.txt")));
        assert!(!is_gzipped(Path::new("gz")));
    }

    #[test]
    fn test_sample_name_strips_only_compression_suffix() {
        assert_eq!(sample_name_from_path(Path::new("a/b/S1.gz")), "S1");
        assert_eq!(sample_name_from_path(Path::new("S1.bgz")), "S1");
        // The original name ending in 'z' or 'g' is preserved
        assert_eq!(sample_name_from_path(Path::new("pag")), "pag");
        assert_eq!(sample_name_from_path(Path::new("S1.txt")), "S1.txt");
    }

    #[test]
    fn test_find_duplicate_name() {
        let names = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(find_duplicate_name(&names), Some("a"));
        let names = vec!["a".to_string(), "b".to_string()];
        assert_eq!(find_duplicate_name(&names), None);
    }
}
