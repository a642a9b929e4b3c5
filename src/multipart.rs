//! multipart/form-data body decomposition.
//!
//! A multipart body is split on literal occurrences of the `--boundary`
//! delimiter declared by the request's Content-Type. Each segment between
//! delimiters carries its own header block and a binary payload. Matching
//! is exact-byte: boundary tokens containing characters that are special
//! to pattern languages change nothing.
//!
//! The parser operates on a complete in-memory body and never panics on
//! malformed input; truncated or separator-less segments come back as
//! [`HttpError`] values for the caller to turn into a 400-class reply.

use crate::error::HttpError;
use crate::http::parse_header_lines;
use crate::utils::{find_bytes, split_header_block};
use std::collections::HashMap;

const DEFAULT_MAX_PARTS: usize = 100;
const DEFAULT_MAX_PART_HEADERS_SIZE: usize = 8 * 1024;

/// Limits applied while splitting a multipart body.
#[derive(Debug, Clone)]
pub struct MultipartLimits {
    /// Maximum number of parts allowed
    pub max_parts: usize,
    /// Maximum size of a single part's header block in bytes
    pub max_part_headers_size: usize,
}

impl Default for MultipartLimits {
    fn default() -> Self {
        Self {
            max_parts: DEFAULT_MAX_PARTS,
            max_part_headers_size: DEFAULT_MAX_PART_HEADERS_SIZE,
        }
    }
}

/// One section of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// The part's own header lines, names lowercased
    pub headers: HashMap<String, String>,
    /// Content-Disposition `name` parameter, when supplied
    pub name: Option<String>,
    /// Content-Disposition `filename` parameter; `None` for non-file fields
    pub filename: Option<String>,
    /// Raw payload with delimiters and the trailing line break stripped
    pub body: Vec<u8>,
}

impl Part {
    /// Whether this part carries an uploaded file
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// The payload as UTF-8 text
    pub fn text(&self) -> Result<String, HttpError> {
        String::from_utf8(self.body.clone())
            .map_err(|_| HttpError::malformed_segment("part body is not valid UTF-8"))
    }
}

/// Extract the boundary token from a Content-Type header value.
///
/// Returns `None` unless the media type is `multipart/...` and a
/// non-empty `boundary` parameter (quoted or unquoted) is present.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    let mut pieces = content_type.split(';');
    let media_type = pieces.next()?.trim();
    if !media_type.to_ascii_lowercase().starts_with("multipart/") {
        return None;
    }

    for piece in pieces {
        if let Some((key, value)) = piece.split_once('=') {
            if key.trim().eq_ignore_ascii_case("boundary") {
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                if value.is_empty() {
                    return None;
                }
                return Some(value.to_string());
            }
        }
    }

    None
}

/// Split a multipart body into its parts using default limits.
pub fn parse_multipart_body(body: &[u8], boundary: &str) -> Result<Vec<Part>, HttpError> {
    parse_multipart(body, boundary, &MultipartLimits::default())
}

/// Split a multipart body into its parts.
///
/// The delimiter on the wire is `--` + boundary; the terminal delimiter
/// adds a trailing `--`. Preamble before the first delimiter and epilogue
/// after the terminal one are discarded. The line break immediately before
/// each delimiter belongs to the delimiter, not to the preceding payload.
pub fn parse_multipart(
    body: &[u8],
    boundary: &str,
    limits: &MultipartLimits,
) -> Result<Vec<Part>, HttpError> {
    if boundary.is_empty() {
        return Err(HttpError::MissingMultipartBoundary);
    }

    let delimiter = [b"--".as_slice(), boundary.as_bytes()].concat();

    let mut positions = Vec::new();
    let mut search = 0;
    while let Some(found) = find_bytes(&body[search..], &delimiter) {
        positions.push(search + found);
        search += found + delimiter.len();
    }

    if positions.is_empty() {
        return Err(HttpError::MissingMultipartBoundary);
    }

    let mut parts = Vec::new();
    for (i, &pos) in positions.iter().enumerate() {
        let after = pos + delimiter.len();

        // "--boundary--" closes the body; anything beyond is epilogue
        if body[after..].starts_with(b"--") {
            break;
        }

        if parts.len() >= limits.max_parts {
            return Err(HttpError::malformed_segment(format!(
                "more than {} parts",
                limits.max_parts
            )));
        }

        // Skip the remainder of the delimiter line, padding included
        let segment_start = match find_bytes(&body[after..], b"\n") {
            Some(p) => after + p + 1,
            None => {
                return Err(HttpError::malformed_segment(
                    "boundary line not terminated",
                ));
            }
        };

        let segment = match positions.get(i + 1) {
            Some(&next) => {
                if segment_start > next {
                    return Err(HttpError::malformed_segment(
                        "boundary line runs into next delimiter",
                    ));
                }
                strip_trailing_line_break(&body[segment_start..next])
            }
            // Truncated body without a terminal delimiter: take the rest as
            // received, there is no delimiter to own a trailing line break
            None => &body[segment_start..],
        };

        parts.push(parse_segment(segment, limits)?);
    }

    Ok(parts)
}

/// The single line break preceding a delimiter is framing, not payload.
fn strip_trailing_line_break(segment: &[u8]) -> &[u8] {
    if segment.ends_with(b"\r\n") {
        &segment[..segment.len() - 2]
    } else if segment.ends_with(b"\n") {
        &segment[..segment.len() - 1]
    } else {
        segment
    }
}

fn parse_segment(segment: &[u8], limits: &MultipartLimits) -> Result<Part, HttpError> {
    // A part may carry no headers at all, in which case the segment opens
    // directly with the blank line
    let (head, payload) = if let Some(rest) = segment.strip_prefix(b"\r\n".as_slice()) {
        ("".to_string(), rest)
    } else if let Some(rest) = segment.strip_prefix(b"\n".as_slice()) {
        ("".to_string(), rest)
    } else {
        let (head, payload_start) = split_header_block(segment);
        if head.len() == segment.len() {
            return Err(HttpError::malformed_segment(
                "part without header/body separator",
            ));
        }
        let head = std::str::from_utf8(head)
            .map_err(|_| HttpError::malformed_segment("part headers are not valid UTF-8"))?;
        (head.to_string(), &segment[payload_start..])
    };

    if head.len() > limits.max_part_headers_size {
        return Err(HttpError::malformed_segment(format!(
            "part headers too large: {} bytes",
            head.len()
        )));
    }

    let headers = parse_header_lines(&head);

    let (name, filename) = match headers.get("content-disposition") {
        Some(disposition) => (
            disposition_param(disposition, "name"),
            disposition_param(disposition, "filename"),
        ),
        None => (None, None),
    };

    Ok(Part {
        headers,
        name,
        filename,
        body: payload.to_vec(),
    })
}

/// Pull a single parameter out of a Content-Disposition value,
/// stripping surrounding quotes when present.
fn disposition_param(disposition: &str, param: &str) -> Option<String> {
    for piece in disposition.split(';').skip(1) {
        if let Some((key, value)) = piece.split_once('=') {
            if key.trim().eq_ignore_ascii_case(param) {
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                return Some(value.to_string());
            }
        }
    }
    None
}
