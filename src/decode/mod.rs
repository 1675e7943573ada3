//! Response body decoding.
//!
//! [`decode`] is total: whatever the bytes and declared encoding, it returns
//! text. Decompression is attempted for every method named in the declared
//! `Content-Encoding` (brotli, then gzip, then deflate); each attempt is
//! isolated. The inflated (or raw) bytes are then turned into text with the
//! charset the response declared, falling back to strict UTF-8 and finally
//! to lossy UTF-8.

pub mod snapshot;

use std::io::Read;

use encoding_rs::Encoding;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

const BROTLI_BUFFER_SIZE: usize = 4096;

/// Decompression methods in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Brotli,
    Gzip,
    Deflate,
}

impl Method {
    const PRIORITY: [Method; 3] = [Method::Brotli, Method::Gzip, Method::Deflate];

    fn token(self) -> &'static str {
        match self {
            Method::Brotli => "br",
            Method::Gzip => "gzip",
            Method::Deflate => "deflate",
        }
    }

    fn decompress(self, bytes: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Method::Brotli => {
                brotli::Decompressor::new(bytes, BROTLI_BUFFER_SIZE).read_to_end(&mut out)?;
            }
            Method::Gzip => {
                GzDecoder::new(bytes).read_to_end(&mut out)?;
            }
            Method::Deflate => {
                // servers disagree on whether "deflate" means zlib-wrapped or raw
                if ZlibDecoder::new(bytes).read_to_end(&mut out).is_err() {
                    out.clear();
                    DeflateDecoder::new(bytes).read_to_end(&mut out)?;
                }
            }
        }
        Ok(out)
    }
}

/// Names the methods a `Content-Encoding` value declares, in priority order.
fn declared_methods(declared_encoding: &str) -> Vec<Method> {
    let declared = declared_encoding.to_ascii_lowercase();
    let tokens: Vec<&str> = declared
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    Method::PRIORITY
        .into_iter()
        .filter(|m| {
            tokens
                .iter()
                .any(|t| *t == m.token() || (*m == Method::Gzip && *t == "x-gzip"))
        })
        .collect()
}

/// Decode a response body into text. Never fails.
pub fn decode(bytes: &[u8], declared_encoding: &str) -> String {
    decode_with_charset(bytes, declared_encoding, None)
}

/// [`decode`], additionally honouring the charset named by the response's
/// `Content-Type`.
pub fn decode_with_charset(
    bytes: &[u8],
    declared_encoding: &str,
    charset: Option<&str>,
) -> String {
    for method in declared_methods(declared_encoding) {
        match method.decompress(bytes) {
            Ok(inflated) => {
                log::debug!("[decode] {} decompression succeeded", method.token());
                return text_of(&inflated, charset);
            }
            Err(e) => log::debug!("[decode] {} decompression failed: {e}", method.token()),
        }
    }
    text_of(bytes, charset)
}

/// Charset parameter of a `Content-Type` value, e.g. `shift_jis` in
/// `text/html; charset="Shift_JIS"`.
pub fn charset_of(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|v| !v.is_empty())
    })
}

fn text_of(bytes: &[u8], charset: Option<&str>) -> String {
    if let Some(label) = charset {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => {
                let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
                if !had_errors {
                    return text.into_owned();
                }
                log::debug!("[decode] body is not valid {}", encoding.name());
            }
            None => log::debug!("[decode] unknown charset {label:?}"),
        }
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            log::debug!("[decode] body is not valid UTF-8 ({e}), replacing invalid sequences");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
