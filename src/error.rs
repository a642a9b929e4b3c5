// SPDX-License-Identifier: MIT

use std::fmt;

#[derive(Debug)]
pub enum HttpError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    MalformedRequestLine(String),  // Contains the offending request line
    MalformedHeader(String),       // Contains the offending header data
    MissingMultipartBoundary,
    MalformedMultipartSegment(String), // Contains details about the bad segment
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Io(err) => write!(f, "IO error: {err}"),
            HttpError::Serialization(err) => write!(f, "JSON serialization error: {err}"),
            HttpError::MalformedRequestLine(line) => {
                write!(f, "Malformed request line: '{line}'")
            }
            HttpError::MalformedHeader(detail) => write!(f, "Malformed header: {detail}"),
            HttpError::MissingMultipartBoundary => {
                write!(f, "Multipart boundary not found in body")
            }
            HttpError::MalformedMultipartSegment(detail) => {
                write!(f, "Malformed multipart segment: {detail}")
            }
        }
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Io(err)
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Serialization(err)
    }
}

impl std::error::Error for HttpError {}

impl HttpError {
    /// Creates a MalformedRequestLine error
    pub fn malformed_request_line<S: Into<String>>(line: S) -> Self {
        HttpError::MalformedRequestLine(line.into())
    }

    /// Creates a MalformedHeader error
    pub fn malformed_header<S: Into<String>>(detail: S) -> Self {
        HttpError::MalformedHeader(detail.into())
    }

    /// Creates a MalformedMultipartSegment error
    pub fn malformed_segment<S: Into<String>>(detail: S) -> Self {
        HttpError::MalformedMultipartSegment(detail.into())
    }

    /// Checks if the error was produced while parsing the request bytes
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            HttpError::MalformedRequestLine(_)
                | HttpError::MalformedHeader(_)
                | HttpError::MissingMultipartBoundary
                | HttpError::MalformedMultipartSegment(_)
        )
    }

    /// Suggested status line for answering this error over the wire.
    ///
    /// Parse failures map to 400, everything else to 500; the caller is
    /// free to override when it knows better.
    pub fn status(&self) -> (u16, &'static str) {
        if self.is_parse_error() {
            (400, "Bad Request")
        } else {
            (500, "Internal Server Error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let errors = [
            HttpError::malformed_request_line("GET"),
            HttpError::malformed_header("line without colon"),
            HttpError::MissingMultipartBoundary,
            HttpError::malformed_segment("no header separator"),
        ];

        let expected = [
            "Malformed request line: 'GET'",
            "Malformed header: line without colon",
            "Multipart boundary not found in body",
            "Malformed multipart segment: no header separator",
        ];

        for (error, expected_msg) in errors.iter().zip(expected.iter()) {
            assert_eq!(error.to_string(), *expected_msg);
        }
    }

    #[test]
    fn test_is_parse_error() {
        let parse_errors = vec![
            HttpError::malformed_request_line("x"),
            HttpError::malformed_header("x"),
            HttpError::MissingMultipartBoundary,
            HttpError::malformed_segment("x"),
        ];

        for error in parse_errors {
            assert!(error.is_parse_error(), "Expected {error} to be a parse error");
            assert_eq!(error.status(), (400, "Bad Request"));
        }

        let io_error = HttpError::Io(std::io::Error::other("broken pipe"));
        assert!(!io_error.is_parse_error());
        assert_eq!(io_error.status(), (500, "Internal Server Error"));
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = HttpError::MissingMultipartBoundary;
        let _: &dyn std::error::Error = &error; // This ensures Error trait is implemented
    }
}
