use encoding_rs::{Encoding, UTF_8};

use crate::{FailureKind, FetchError, FetchOutput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}")]
    Malformed { encoding: String },
}

impl From<DecodeError> for FetchError {
    fn from(err: DecodeError) -> Self {
        let DecodeError::Malformed { encoding } = &err;
        FetchError::new(
            FailureKind::Undecodable {
                encoding: encoding.clone(),
            },
            err.to_string(),
        )
    }
}

/// Decode a response body into text using: BOM -> Content-Type charset -> UTF-8.
///
/// Malformed sequences are an error.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedBody, DecodeError> {
    let (body, encoding) = pick_encoding(bytes, content_type);
    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(DecodedBody {
        text: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

/// Same encoding choice as [`decode_body`], but malformed sequences become
/// U+FFFD the way a browser's `Response.text()` does.
pub fn decode_body_lossy(bytes: &[u8], content_type: Option<&str>) -> DecodedBody {
    let (body, encoding) = pick_encoding(bytes, content_type);
    let (text, _) = encoding.decode_without_bom_handling(body);
    DecodedBody {
        text: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    }
}

/// Reads the text of a completed fetch, replacing malformed sequences.
pub fn response_text(output: &FetchOutput) -> String {
    decode_body_lossy(&output.body, output.metadata.content_type.as_deref()).text
}

/// Reads the text of a completed fetch, failing on malformed sequences.
pub fn strict_response_text(output: &FetchOutput) -> Result<String, FetchError> {
    let decoded = decode_body(&output.body, output.metadata.content_type.as_deref())?;
    Ok(decoded.text)
}

fn pick_encoding<'a>(bytes: &'a [u8], content_type: Option<&str>) -> (&'a [u8], &'static Encoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return (&bytes[bom_len..], encoding);
    }
    let declared = content_type
        .and_then(extract_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()));
    (bytes, declared.unwrap_or(UTF_8))
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches(['"', '\'']).to_string())
        })
        .next()
}
