//! Text decoding with an ordered encoding fallback list
//!
//! This is not detection: each candidate is tried in turn and the first one
//! that decodes without malformed sequences wins. When none does, the bytes
//! are decoded as lossy UTF-8 and the result is flagged as degraded.

use encoding_rs::{Encoding, UTF_8};

/// Candidate encodings, tried in this order
pub const CANDIDATE_ENCODINGS: [&str; 4] = ["utf-8", "gbk", "gb2312", "big5"];

/// Outcome of decoding a byte buffer
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Decoded text
    pub text: String,
    /// Encoding that produced `text`
    pub encoding: &'static Encoding,
    /// True when every candidate failed and lossy UTF-8 was used
    pub degraded: bool,
}

/// Decode `bytes` using [`CANDIDATE_ENCODINGS`], falling back to lossy UTF-8
pub fn decode(bytes: &[u8]) -> Decoded {
    for label in CANDIDATE_ENCODINGS {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            continue;
        };

        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return Decoded {
                text: text.into_owned(),
                encoding,
                degraded: false,
            };
        }
    }

    let (text, _) = UTF_8.decode_without_bom_handling(bytes);
    Decoded {
        text: text.into_owned(),
        encoding: UTF_8,
        degraded: true,
    }
}
