//! Percent-encoding sets shared by signing, URL building and paths.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the OAuth unreserved characters (`A-Z a-z 0-9 - . _ ~`).
pub const OAUTH_RESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// [`OAUTH_RESERVED`] with the path separator left intact.
pub const PATH_RESERVED: &AsciiSet = &OAUTH_RESERVED.remove(b'/');

/// Percent-encode a value for use in a header parameter or query string.
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_RESERVED).to_string()
}

/// Percent-encode a path, leaving `/` separators untouched.
pub fn percent_encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_RESERVED).to_string()
}
