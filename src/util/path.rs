use std::num::NonZeroU32;

use crate::model::{
    listing::{ListingDetails, ListingOptions},
    path::{BlobPath, PrefixPath, ResourceName, DELIMITER},
};

/// Blob key for a path: segments joined by the delimiter, never a leading or
/// trailing one.
pub fn to_object_key(path: &BlobPath) -> String {
    join(path.as_path().segments())
}

/// Prefix string for a listing. The root maps to `""`, anything else ends in
/// exactly one delimiter.
pub fn to_prefix_string(path: &PrefixPath) -> String {
    let segments = path.as_path().segments();
    if segments.is_empty() {
        return String::new();
    }

    normalize_trailing_delimiter(&format!("{}{}", join(segments), DELIMITER))
}

pub fn to_listing_options(
    path: &PrefixPath,
    max_results: Option<NonZeroU32>,
    details: Option<ListingDetails>,
) -> ListingOptions {
    let defaults = ListingOptions::default();

    ListingOptions {
        prefix: to_prefix_string(path),
        delimiter: DELIMITER,
        max_results: max_results.unwrap_or(defaults.max_results),
        details: details.unwrap_or(defaults.details),
    }
}

/// Name of the immediate child a fully qualified key or prefix refers to, or
/// `None` when the key is nothing but delimiters.
pub fn simple_name(native: &str) -> Option<ResourceName> {
    let trimmed = strip_trailing_delimiter(native);
    let name = match trimmed.rfind(DELIMITER) {
        Some(pos) => &trimmed[pos + DELIMITER.len_utf8()..],
        None => trimmed,
    };

    ResourceName::new(name).ok()
}

/// Collapses a run of trailing delimiters down to a single one.
pub fn normalize_trailing_delimiter(prefix: &str) -> String {
    let double = format!("{}{}", DELIMITER, DELIMITER);
    if prefix.ends_with(&double) {
        return normalize_trailing_delimiter(&prefix[..prefix.len() - DELIMITER.len_utf8()]);
    }

    prefix.to_string()
}

fn strip_trailing_delimiter(native: &str) -> &str {
    native.trim_end_matches(DELIMITER)
}

fn join(segments: &[ResourceName]) -> String {
    segments
        .iter()
        .map(ResourceName::as_str)
        .collect::<Vec<_>>()
        .join(DELIMITER.to_string().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::path::ResourcePath;

    fn blob(path: &str) -> BlobPath {
        BlobPath::try_from(ResourcePath::parse(path).unwrap()).unwrap()
    }

    fn prefix(path: &str) -> PrefixPath {
        PrefixPath::from(ResourcePath::parse(path).unwrap())
    }

    #[test]
    fn test_to_object_key() {
        let cases = vec![
            ("file.json", "file.json"),
            ("folder/file.json", "folder/file.json"),
            ("/folder/subfolder/file/", "folder/subfolder/file"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                to_object_key(&blob(input)),
                expected,
                "failed for case: {}",
                input
            );
        }
    }

    #[test]
    fn test_to_prefix_string() {
        let cases = vec![
            ("", ""),
            ("/", ""),
            ("folder", "folder/"),
            ("folder/subfolder", "folder/subfolder/"),
            ("folder//", "folder/"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                to_prefix_string(&prefix(input)),
                expected,
                "failed for case: {}",
                input
            );
        }
    }

    #[test]
    fn test_normalize_trailing_delimiter() {
        let cases = vec![
            ("a/", "a/"),
            ("a//", "a/"),
            ("a///", "a/"),
            ("a/b////", "a/b/"),
            ("a", "a"),
            ("", ""),
        ];

        for (input, expected) in cases {
            assert_eq!(
                normalize_trailing_delimiter(input),
                expected,
                "failed for case: {}",
                input
            );
        }
    }

    #[test]
    fn test_simple_name() {
        let cases = vec![
            ("file.json", "file.json"),
            ("folder/file.json", "file.json"),
            ("folder/subfolder/", "subfolder"),
            ("folder/subfolder//", "subfolder"),
            ("top/", "top"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                simple_name(input).unwrap().as_str(),
                expected,
                "failed for case: {}",
                input
            );
        }
    }

    #[test]
    fn test_simple_name_of_bare_delimiters() {
        let cases = vec!["", "/", "//", "///"];

        for input in cases {
            assert!(simple_name(input).is_none(), "failed for case: {:?}", input);
        }
    }

    #[test]
    fn test_prefix_round_trip() {
        let cases = vec![("", "child"), ("folder", "child"), ("a/b/c", "d.json")];

        for (parent, child) in cases {
            let native = format!("{}{}/", to_prefix_string(&prefix(parent)), child);
            assert_eq!(
                simple_name(&native).unwrap().as_str(),
                child,
                "failed for case: {}",
                parent
            );

            let native = format!("{}{}", to_prefix_string(&prefix(parent)), child);
            assert_eq!(
                simple_name(&native).unwrap().as_str(),
                child,
                "failed for case: {}",
                parent
            );
        }
    }

    #[test]
    fn test_to_listing_options() {
        let options = to_listing_options(&prefix("folder"), None, None);
        assert_eq!(options.prefix, "folder/");
        assert_eq!(options.delimiter, '/');
        assert_eq!(options.max_results.get(), 5000);
        assert_eq!(options.details, ListingDetails::default());

        let details = ListingDetails {
            snapshots: false,
            metadata: true,
        };
        let options = to_listing_options(&PrefixPath::root(), NonZeroU32::new(1), Some(details));
        assert_eq!(options.prefix, "");
        assert_eq!(options.max_results.get(), 1);
        assert!(options.details.metadata);
    }
}
