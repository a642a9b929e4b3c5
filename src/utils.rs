use std::collections::HashMap;

/// Exact-byte substring search - find needle in haystack.
///
/// Boundary tokens and header separators must match literally, so all
/// scanning in this crate goes through this helper rather than any
/// pattern language.
pub fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    (0..=(haystack.len() - needle.len())).find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// Locate the header/body separator in a raw buffer.
///
/// Returns the header block and the offset where the body starts. The wire
/// default is `\r\n\r\n`, with bare `\n\n` tolerated; whichever appears
/// first wins. A buffer without a separator is all headers.
pub fn split_header_block(raw: &[u8]) -> (&[u8], usize) {
    let crlf = find_bytes(raw, b"\r\n\r\n");
    let lf = find_bytes(raw, b"\n\n");

    match (crlf, lf) {
        (Some(c), Some(l)) if l < c => (&raw[..l], l + 2),
        (Some(c), _) => (&raw[..c], c + 4),
        (None, Some(l)) => (&raw[..l], l + 2),
        (None, None) => (raw, raw.len()),
    }
}

/// Parse query parameters from a request target
pub fn parse_query_params(target: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    if let Some(query_start) = target.find('?') {
        let query = &target[query_start + 1..];

        for param in query.split('&') {
            if let Some((key, value)) = param.split_once('=') {
                // Simple URL decoding for common characters
                let decoded_value = url_decode(value);
                params.insert(key.to_string(), decoded_value);
            }
        }
    }

    params
}

/// Simple URL decoding for common percent-encoded characters
fn url_decode(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '%' {
            // Try to decode percent-encoded character
            if let (Some(hex1), Some(hex2)) = (chars.next(), chars.next()) {
                if let Ok(byte_val) = u8::from_str_radix(&format!("{hex1}{hex2}"), 16) {
                    if let Some(decoded_char) = char::from_u32(byte_val as u32) {
                        result.push(decoded_char);
                        continue;
                    }
                }
                // If decoding failed, keep the original characters
                result.push('%');
                result.push(hex1);
                result.push(hex2);
            } else {
                result.push(ch);
            }
        } else if ch == '+' {
            // Handle + as space in query parameters
            result.push(' ');
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_bytes_literal_match() {
        assert_eq!(find_bytes(b"abcdef", b"cd"), Some(2));
        assert_eq!(find_bytes(b"abcdef", b"xy"), None);
        assert_eq!(find_bytes(b"ab", b"abc"), None);
        assert_eq!(find_bytes(b"abc", b""), None);
        // Bytes that are special in pattern languages are plain bytes here
        assert_eq!(find_bytes(b"a.*b", b".*"), Some(1));
    }

    #[test]
    fn test_split_header_block_prefers_earliest_separator() {
        let (head, body_start) = split_header_block(b"a\r\n\r\nbody");
        assert_eq!(head, b"a");
        assert_eq!(body_start, 5);

        // Bare LF separator before a CRLF one wins
        let (head, body_start) = split_header_block(b"a\n\nb\r\n\r\nc");
        assert_eq!(head, b"a");
        assert_eq!(body_start, 3);

        let (head, body_start) = split_header_block(b"no separator");
        assert_eq!(head, b"no separator");
        assert_eq!(body_start, 12);
    }

    #[test]
    fn test_parse_query_params_decodes_values() {
        let params = parse_query_params("/speak?text=hello%20world&lang=en+US");
        assert_eq!(params.get("text").map(String::as_str), Some("hello world"));
        assert_eq!(params.get("lang").map(String::as_str), Some("en US"));

        assert!(parse_query_params("/speak").is_empty());
    }
}
