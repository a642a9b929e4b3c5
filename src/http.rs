//! HTTP request parsing.

use crate::error::HttpError;
use crate::multipart::{self, MultipartLimits, Part};
use crate::utils::{parse_query_params, split_header_block};
use log::{debug, warn};
use std::collections::HashMap;

/// Maximum size for the request header block (8KB) to prevent header
/// buffer overflow
pub const MAX_HEADERS_SIZE: usize = 8 * 1024;

/// A parsed incoming HTTP request.
///
/// Produced once per request from a complete raw buffer, read by the
/// dispatch layer, and dropped after the response goes out.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Request method token, as received
    pub method: String,
    /// Request target as received, query string included, not
    /// percent-decoded
    pub path: String,
    /// Header names lowercased; for duplicate headers the last
    /// occurrence wins
    pub headers: HashMap<String, String>,
    /// Raw body bytes, binary-safe
    pub body: Vec<u8>,
    /// Boundary token when Content-Type declares `multipart/...`
    pub multipart_boundary: Option<String>,
    /// Decomposed parts, present only when a boundary was found and the
    /// body split cleanly
    pub multipart_parts: Option<Vec<Part>>,
}

impl Request {
    /// Case-insensitive single-header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Query parameters from the request target, values percent-decoded.
    pub fn query_params(&self) -> HashMap<String, String> {
        parse_query_params(&self.path)
    }
}

/// Parse one complete raw HTTP request buffer.
///
/// The caller owns request framing: this function expects the request
/// line, headers, blank line, and however much body was received, in one
/// buffer. When `Content-Length` is present and more bytes follow the
/// separator, the body is truncated to the declared length; otherwise all
/// remaining bytes are taken.
pub fn parse_request(raw: &[u8]) -> Result<Request, HttpError> {
    let (head, body_start) = split_header_block(raw);

    if head.len() > MAX_HEADERS_SIZE {
        return Err(HttpError::malformed_header(format!(
            "header block too large: {} bytes",
            head.len()
        )));
    }

    // The body is never text; only the header block must be UTF-8
    let head = std::str::from_utf8(head)
        .map_err(|_| HttpError::malformed_header("header block is not valid UTF-8"))?;

    let mut lines = head.lines();
    let request_line = lines
        .next()
        .ok_or_else(|| HttpError::malformed_request_line(""))?;

    let (method, path) = parse_request_line(request_line)?;
    let headers = parse_header_lines_from(lines);

    let mut body = raw[body_start..].to_vec();
    if let Some(declared) = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
    {
        if body.len() > declared {
            debug!(
                "Truncating body from {} to declared Content-Length {declared}",
                body.len()
            );
            body.truncate(declared);
        }
    }

    let mut multipart_boundary = None;
    let mut multipart_parts = None;
    if let Some(content_type) = headers.get("content-type") {
        match multipart::boundary_from_content_type(content_type) {
            Some(boundary) => {
                match multipart::parse_multipart(&body, &boundary, &MultipartLimits::default()) {
                    Ok(parts) => {
                        debug!("Split multipart body into {} parts", parts.len());
                        multipart_parts = Some(parts);
                    }
                    Err(e) => warn!("Failed to split multipart body: {e}"),
                }
                multipart_boundary = Some(boundary);
            }
            None => {
                if content_type
                    .trim_start()
                    .to_ascii_lowercase()
                    .starts_with("multipart/")
                {
                    warn!("Multipart Content-Type without boundary parameter: {content_type}");
                }
            }
        }
    }

    debug!(
        "Parsed request: {method} {path} (headers: {}, body_size: {})",
        headers.len(),
        body.len()
    );

    Ok(Request {
        method,
        path,
        headers,
        body,
        multipart_boundary,
        multipart_parts,
    })
}

/// Split the request line into method and path.
///
/// Two or three whitespace-separated tokens are accepted (the protocol
/// version is optional); anything else is malformed, as is a method that
/// is not a valid HTTP token.
fn parse_request_line(request_line: &str) -> Result<(String, String), HttpError> {
    let tokens: Vec<&str> = request_line.split_whitespace().collect();

    if tokens.len() < 2 || tokens.len() > 3 {
        return Err(HttpError::malformed_request_line(request_line));
    }

    let method = tokens[0];
    if method.is_empty() || !method.bytes().all(is_tchar) {
        return Err(HttpError::malformed_request_line(request_line));
    }

    Ok((method.to_string(), tokens[1].to_string()))
}

/// Parse header lines into a name/value map.
///
/// Each line splits on the first `:`; names are lowercased and values
/// trimmed. Obsolete line folding (a continuation line starting with
/// space or tab) is unfolded into the preceding header's value. A
/// non-continuation line with no colon is skipped rather than failing
/// the request. Duplicate names keep the last occurrence.
pub(crate) fn parse_header_lines(head: &str) -> HashMap<String, String> {
    parse_header_lines_from(head.lines())
}

fn parse_header_lines_from<'a, I>(lines: I) -> HashMap<String, String>
where
    I: Iterator<Item = &'a str>,
{
    let mut headers: HashMap<String, String> = HashMap::new();
    let mut last_name: Option<String> = None;

    for line in lines {
        let folded = line.starts_with(' ') || line.starts_with('\t');
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if folded {
            match last_name.as_ref().and_then(|n| headers.get_mut(n)) {
                Some(value) => {
                    value.push(' ');
                    value.push_str(line);
                }
                None => debug!("Skipping orphan continuation line: {line}"),
            }
            continue;
        }

        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_lowercase();
            headers.insert(name.clone(), value.trim().to_string());
            last_name = Some(name);
        } else {
            debug!("Skipping header line without colon: {line}");
        }
    }

    headers
}

/// RFC 7230 token characters, the legal alphabet for method names.
fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}
