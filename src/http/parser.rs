use crate::http::request::{find_header, Method, Request};
use std::collections::HashMap;
use thiserror::Error;

/// Upper bound on the request line plus headers.
pub const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Upper bound on a Content-Length framed request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid request line")]
    InvalidRequest,
    #[error("unknown method")]
    InvalidMethod,
    #[error("malformed header line")]
    InvalidHeader,
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("request headers exceed {MAX_HEADER_BYTES} bytes")]
    HeadersTooLarge,
    #[error("request body exceeds {MAX_BODY_BYTES} bytes")]
    BodyTooLarge,
    #[error("unsupported Transfer-Encoding")]
    UnsupportedTransferEncoding,
    #[error("incomplete request")]
    Incomplete,
}

pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {

    // Look for header/body separator
    let headers_end = match find_headers_end(buf) {
        Some(end) => end,
        None if buf.len() > MAX_HEADER_BYTES => return Err(ParseError::HeadersTooLarge),
        None => return Err(ParseError::Incomplete),
    };
    if headers_end > MAX_HEADER_BYTES {
        return Err(ParseError::HeadersTooLarge);
    }

    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes)
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    if parts.next().is_some() || !version.starts_with("HTTP/") {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or(ParseError::InvalidHeader)?;

        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError::InvalidHeader);
        }

        let value = value.trim();
        // Repeated Content-Length is tolerated only when the values agree
        if key.eq_ignore_ascii_case("Content-Length")
            && let Some(existing) = find_header(&headers, key)
            && existing != value
        {
            return Err(ParseError::InvalidContentLength);
        }

        headers.insert(key.to_string(), value.to_string());
    }

    // Only Content-Length framed bodies are supported
    if let Some(te) = find_header(&headers, "Transfer-Encoding") {
        if !te.eq_ignore_ascii_case("identity") {
            return Err(ParseError::UnsupportedTransferEncoding);
        }
    }

    // Body
    let content_length = content_length(&headers)?;

    // Reject before buffering any of it
    if content_length > MAX_BODY_BYTES {
        return Err(ParseError::BodyTooLarge);
    }

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = body_bytes[..content_length].to_vec();

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))

}

/// Declared body length; a missing header means no body.
pub fn content_length(headers: &HashMap<String, String>) -> Result<usize, ParseError> {
    find_header(headers, "Content-Length")
        .map(|v| v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()
        .map(|len| len.unwrap_or(0))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}
