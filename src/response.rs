//! HTTP/1.1 response serialization onto a client connection.
//!
//! Three entry points converge on one wire writer: raw bytes, a JSON
//! document, and the fixed `{"error": ...}` envelope the rest of the
//! server answers failures with. All three are generic over
//! [`std::io::Write`] so a `TcpStream` and a test buffer behave the same.

use crate::error::HttpError;
use crate::{NAME, VERSION};
use log::debug;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::io::Write;

/// Write a complete response: status line, headers, blank line, body.
///
/// `Content-Length` is always computed from the body's exact byte length;
/// a conflicting caller-supplied value is dropped. Body bytes go out
/// verbatim, no transcoding. Write failures, partial writes included,
/// surface as `Err`; nothing is retried here.
pub fn send_response<W: Write>(
    conn: &mut W,
    status_code: u16,
    status_text: &str,
    headers: &HashMap<String, String>,
    body: &[u8],
) -> Result<(), HttpError> {
    debug!("Sending response: {status_code} {status_text} ({} body bytes)", body.len());

    let mut head = format!("HTTP/1.1 {status_code} {status_text}\r\n");
    head.push_str(&format!("Server: {NAME}/{VERSION}\r\n"));
    head.push_str("Connection: close\r\n");

    for (name, value) in headers {
        // The real length is computed below
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        head.push_str(&format!("{name}: {value}\r\n"));
    }

    head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    head.push_str("\r\n");

    conn.write_all(head.as_bytes())?;
    conn.write_all(body)?;
    conn.flush()?;
    Ok(())
}

/// Serialize `value` to JSON and send it with `Content-Type:
/// application/json`.
///
/// Serialization happens before anything touches the connection, so a
/// failing body never produces a half-written response.
pub fn send_json_response<W, T>(
    conn: &mut W,
    status_code: u16,
    status_text: &str,
    value: &T,
) -> Result<(), HttpError>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(value)?;

    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    send_response(conn, status_code, status_text, &headers, &body)
}

/// Send the uniform failure envelope `{"error": message}`.
///
/// The status code carries the semantics; this layer fixes only the body
/// shape.
pub fn send_error_response<W: Write>(
    conn: &mut W,
    status_code: u16,
    status_text: &str,
    message: &str,
) -> Result<(), HttpError> {
    send_json_response(conn, status_code, status_text, &json!({ "error": message }))
}
