//! MIME type detection.
//!
//! Detection is by file extension only; names without a known extension are
//! treated as `text/plain`.

pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// Bytes inspected by [`is_binary`].
const SNIFF_LEN: usize = 8000;

pub fn detect(name: &str) -> String {
    mime_guess::from_path(name)
        .first_raw()
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}

/// Whether a MIME type holds printable text.
pub fn is_text(mime_type: &str) -> bool {
    if mime_type.starts_with("text/") {
        return true;
    }
    if mime_type.starts_with("application/")
        && (mime_type.contains("html") || mime_type.contains("xml") || mime_type.contains("json"))
    {
        return true;
    }
    mime_type == "application/javascript"
}

/// Same heuristic git uses: a NUL byte near the start means binary.
pub fn is_binary(data: &[u8]) -> bool {
    data.iter().take(SNIFF_LEN).any(|&b| b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(detect("logo.png"), "image/png");
        assert_eq!(detect("src/index.html"), "text/html");
    }

    #[test]
    fn unknown_extension_is_plain_text() {
        assert_eq!(detect("Makefile"), "text/plain");
        assert_eq!(detect("README"), "text/plain");
    }

    #[test]
    fn text_classification() {
        assert!(is_text("text/x-python"));
        assert!(is_text("application/xhtml+xml"));
        assert!(is_text("application/javascript"));
        assert!(!is_text("image/png"));
        assert!(!is_text("application/octet-stream"));
    }

    #[test]
    fn nul_byte_means_binary() {
        assert!(is_binary(b"\x89PNG\r\n\x1a\n\0\0"));
        assert!(!is_binary(b"fn main() {}\n"));
    }
}
