//! Data URL parsing for uploaded crop images

/// Required prefix of every uploaded image
pub const DATA_URL_PREFIX: &str = "data:image/";

/// Borrowed view of a `data:image/...` URL
///
/// Only the prefix is validated. Everything after it is best-effort
/// metadata for the analyzer: a malformed header yields an empty payload
/// rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    media_type: &'a str,
    base64: bool,
    payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Returns `None` unless the input starts with `data:image/`
    pub fn parse(input: &'a str) -> Option<Self> {
        if !input.starts_with(DATA_URL_PREFIX) {
            return None;
        }

        let rest = &input["data:".len()..];
        let (header, payload) = rest.split_once(',').unwrap_or((rest, ""));
        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default();
        let base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        Some(Self {
            media_type,
            base64,
            payload,
        })
    }

    /// MIME type, e.g. `image/jpeg`
    pub const fn media_type(&self) -> &'a str {
        self.media_type
    }

    pub const fn is_base64(&self) -> bool {
        self.base64
    }

    /// Approximate size of the decoded image in bytes
    pub fn decoded_len_hint(&self) -> usize {
        if self.base64 {
            self.payload.trim_end_matches('=').len() * 3 / 4
        } else {
            self.payload.len()
        }
    }
}
