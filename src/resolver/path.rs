//! Path grammar.
//!
//! Pure functions that turn a raw API path into a [`PathTarget`]: the resource
//! kind it addresses plus the key material needed to fetch it. Nothing here
//! touches the content graph.

use crate::framework::ApiError;
use crate::model::ResourceKind;

/// Delimiter between a parent model path and a filename.
pub const FILES_DELIMITER: &str = "/files/";

/// A classified path, ready for lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTarget {
    Site,
    Account,
    /// Decoded page id (`+` and space already mapped to `/`).
    Page { id: String },
    /// Parent path still to be resolved, and the decoded filename.
    File { parent: String, filename: String },
    User { id: String },
}

impl PathTarget {
    pub fn kind(&self) -> ResourceKind {
        match self {
            PathTarget::Site => ResourceKind::Site,
            PathTarget::Account => ResourceKind::Account,
            PathTarget::Page { .. } => ResourceKind::Page,
            PathTarget::File { .. } => ResourceKind::File,
            PathTarget::User { .. } => ResourceKind::User,
        }
    }
}

/// Classifies `path` into a resource kind and its key.
///
/// `"site"` and `"account"` are reserved literals. Any other path is
/// classified by its parent directory, the *kind selector*. A selector ending
/// in `/files` always addresses a file, whatever precedes it.
pub fn classify(path: &str) -> Result<PathTarget, ApiError> {
    let path = path.trim_matches('/');

    if path == "site" || path == "account" {
        return select(path, path);
    }

    let selector = dirname(path);
    select(selector, path)
}

fn select(selector: &str, path: &str) -> Result<PathTarget, ApiError> {
    if selector.ends_with("/files") {
        return file_target(path);
    }

    match selector {
        "site" => Ok(PathTarget::Site),
        "account" => Ok(PathTarget::Account),
        "users" => Ok(PathTarget::User {
            id: basename(path).to_string(),
        }),
        "pages" => Ok(PathTarget::Page {
            id: page_id(basename(path)),
        }),
        // Page ids may arrive with their slashes intact.
        s if s.starts_with("pages/") => Ok(PathTarget::Page {
            id: page_id(&path["pages/".len()..]),
        }),
        _ => Err(ApiError::InvalidKind(selector.to_string())),
    }
}

fn file_target(path: &str) -> Result<PathTarget, ApiError> {
    match path.split_once(FILES_DELIMITER) {
        Some((parent, filename)) if !parent.is_empty() && !filename.is_empty() => {
            Ok(PathTarget::File {
                parent: parent.to_string(),
                filename: percent_decode(filename),
            })
        }
        _ => Err(ApiError::InvalidKind(dirname(path).to_string())),
    }
}

/// Turns the id segment of a page path into a page id.
///
/// The segment is percent-decoded, then `+` and literal spaces both become `/`.
pub fn page_id(segment: &str) -> String {
    percent_decode(segment)
        .replace(['+', ' '], "/")
        .trim_matches('/')
        .to_string()
}

/// The path with its last segment removed, trailing slashes trimmed.
pub fn dirname(path: &str) -> &str {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some((parent, _)) => parent.trim_end_matches('/'),
        None => "",
    }
}

/// The last segment of the path.
pub fn basename(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    match path.rsplit_once('/') {
        Some((_, last)) => last,
        None => path,
    }
}

/// Decodes `%XX` escapes. A `+` is left alone; malformed escapes pass through
/// verbatim and invalid UTF-8 is replaced.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(h), Some(l)) => {
                        out.push(h * 16 + l);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Encodes everything outside the unreserved set (`A-Z a-z 0-9 - . _ ~`).
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_literals() {
        assert_eq!(classify("site").unwrap(), PathTarget::Site);
        assert_eq!(classify("account").unwrap(), PathTarget::Account);
    }

    #[test]
    fn test_page_ids_decode_plus_and_space() {
        let expected = PathTarget::Page { id: "a/b/c".into() };
        assert_eq!(classify("pages/a+b+c").unwrap(), expected);
        assert_eq!(classify("pages/a%20b%20c").unwrap(), expected);
        assert_eq!(classify("pages/a b c").unwrap(), expected);
        assert_eq!(classify("pages/a/b/c").unwrap(), expected);
    }

    #[test]
    fn test_files_suffix_wins() {
        assert_eq!(
            classify("pages/x/files/my%20file.jpg").unwrap(),
            PathTarget::File {
                parent: "pages/x".into(),
                filename: "my file.jpg".into(),
            }
        );
        assert_eq!(
            classify("users/files/a.png").unwrap().kind(),
            ResourceKind::File
        );
    }

    #[test]
    fn test_filename_keeps_plus() {
        assert_eq!(
            classify("site/files/my+file.jpg").unwrap(),
            PathTarget::File {
                parent: "site".into(),
                filename: "my+file.jpg".into(),
            }
        );
    }

    #[test]
    fn test_unknown_selectors_are_invalid() {
        for path in ["widgets/1", "", "pages", "users", "42"] {
            assert!(
                matches!(classify(path), Err(ApiError::InvalidKind(_))),
                "{path:?} should be an invalid kind"
            );
        }
    }

    #[test]
    fn test_dirname_and_basename() {
        assert_eq!(dirname("pages/blog/post-1"), "pages/blog");
        assert_eq!(dirname("pages/"), "");
        assert_eq!(basename("pages/blog/post-1"), "post-1");
        assert_eq!(basename("users/42"), "42");
    }

    #[test]
    fn test_percent_codec() {
        assert_eq!(percent_decode("my%20file.jpg"), "my file.jpg");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("caf%C3%A9"), "café");
        assert_eq!(percent_encode("my file.jpg"), "my%20file.jpg");
        assert_eq!(percent_encode("café"), "caf%C3%A9");
    }
}
