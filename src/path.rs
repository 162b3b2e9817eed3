//! Path and reference string utilities
//!
//! Helpers shared by the patcher and the bundler for rewriting document
//! suffixes, splitting `$ref` values, and building or reading JSON Pointer
//! fragments.

use crate::config::{INPUT_SUFFIX, OUTPUT_SUFFIX};

/// Replace a trailing `.spec.yml` with `.jsonschema.json`. Paths with any
/// other suffix are returned unchanged.
pub fn rewrite_suffix(path: &str) -> String {
    match path.strip_suffix(INPUT_SUFFIX) {
        Some(stem) => format!("{}{}", stem, OUTPUT_SUFFIX),
        None => path.to_string(),
    }
}

/// Split a reference at its first `#` into the base and the fragment.
pub fn split_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (reference, None),
    }
}

/// Percent-encode `^` in a fragment. No other character is touched.
pub fn encode_fragment_carets(fragment: &str) -> String {
    fragment.replace('^', "%5E")
}

/// Decode `%XX` escapes. Invalid escapes are kept literally.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                decoded.push(byte);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

/// Escape one JSON Pointer reference token (`~` to `~0`, `/` to `~1`).
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Whether a fragment is a JSON Pointer (empty or starting with `/`) as
/// opposed to a plain-name anchor.
pub fn is_pointer_fragment(fragment: &str) -> bool {
    fragment.is_empty() || fragment.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_suffix() {
        assert_eq!(
            rewrite_suffix("input/manifest.spec.yml"),
            "input/manifest.jsonschema.json"
        );
        assert_eq!(rewrite_suffix("manifest.jsonschema.json"), "manifest.jsonschema.json");
        assert_eq!(rewrite_suffix("notes.yml"), "notes.yml");
    }

    #[test]
    fn test_split_reference() {
        assert_eq!(split_reference("a.spec.yml#/b"), ("a.spec.yml", Some("/b")));
        assert_eq!(split_reference("#/b"), ("", Some("/b")));
        assert_eq!(split_reference("a.spec.yml"), ("a.spec.yml", None));
        assert_eq!(split_reference("a#b#c"), ("a", Some("b#c")));
    }

    #[test]
    fn test_encode_fragment_carets_only() {
        assert_eq!(encode_fragment_carets("/bar^baz"), "/bar%5Ebaz");
        assert_eq!(encode_fragment_carets("/a b/[x]^"), "/a b/[x]%5E");
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("/bar%5Ebaz"), "/bar^baz");
        assert_eq!(percent_decode("%25"), "%");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn test_escape_pointer_token() {
        assert_eq!(
            escape_pointer_token("input/manifest.jsonschema.json"),
            "input~1manifest.jsonschema.json"
        );
        assert_eq!(escape_pointer_token("a~b"), "a~0b");
    }

    #[test]
    fn test_is_pointer_fragment() {
        assert!(is_pointer_fragment(""));
        assert!(is_pointer_fragment("/$defs/x"));
        assert!(!is_pointer_fragment("my-anchor"));
    }
}
