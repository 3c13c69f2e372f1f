//! The two request representations seen by the interception pipeline.
//!
//! [`RawRequest`] is the transport-level form: unparsed URI, header map,
//! body bytes. [`ParsedRequest`] is the framework-parsed form used for
//! handler and principal resolution. Query and body parameters are always
//! captured from the raw form, before dispatch — later framework
//! processing may consume or alter the body, the `Bytes` handle here never
//! does.

use apitrail_core::Principal;
use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;

/// Transport-level request as received from the wire.
#[derive(Debug, Clone)]
pub struct RawRequest {
    /// HTTP method (uppercase).
    pub method: String,
    /// Request URI, path plus optional query string.
    pub uri: String,
    pub headers: HashMap<String, String>,
    /// Direct peer address, when the transport exposes one.
    pub remote_addr: Option<String>,
    /// Request body. Cloning is cheap and reading never consumes.
    pub body: Bytes,
    /// Principal attached by an earlier authentication layer, if any.
    pub principal: Option<Principal>,
}

impl RawRequest {
    /// Get a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URI path without the query string.
    pub fn path(&self) -> &str {
        match self.uri.find('?') {
            Some(pos) => &self.uri[..pos],
            None => &self.uri,
        }
    }

    /// Query string without the leading `?`. Empty when absent.
    pub fn query_string(&self) -> &str {
        match self.uri.find('?') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Parse the query string into a key/value mapping. Idempotent.
    pub fn query_map(&self) -> HashMap<String, Value> {
        parse_urlencoded(self.query_string())
    }

    /// Best-effort parse of the body into a key/value mapping.
    ///
    /// JSON objects and urlencoded forms are understood; anything else
    /// (other content types, malformed payloads, non-object JSON) yields
    /// an empty mapping — never an error. Idempotent: the body bytes are
    /// read, not consumed.
    pub fn body_map(&self) -> HashMap<String, Value> {
        if self.body.is_empty() {
            return HashMap::new();
        }
        let content_type = self.header("content-type").unwrap_or("");
        if content_type.starts_with("application/json") {
            return match serde_json::from_slice::<Value>(&self.body) {
                Ok(Value::Object(map)) => map.into_iter().collect(),
                _ => HashMap::new(),
            };
        }
        if content_type.starts_with("application/x-www-form-urlencoded") {
            let text = String::from_utf8_lossy(&self.body);
            return parse_urlencoded(&text);
        }
        HashMap::new()
    }
}

/// Framework-parsed request used for handler and principal resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub method: String,
    pub path: String,
    pub host: String,
    pub query_params: HashMap<String, Value>,
    pub principal: Option<Principal>,
    /// The matched handler, when dispatch has resolved one.
    pub handler: Option<HandlerRef>,
}

impl ParsedRequest {
    pub fn with_handler(mut self, handler: HandlerRef) -> Self {
        self.handler = Some(handler);
        self
    }
}

/// Identity of a matched request handler.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerRef {
    /// Qualified handler name, e.g. `items::ItemListHandler`.
    pub identifier: String,
    /// Logical action name (`list`, `retrieve`, …), when declared.
    pub action: Option<String>,
}

impl HandlerRef {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            action: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

// ── urlencoded parsing ───────────────────────────────────────────────────────

fn parse_urlencoded(input: &str) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        map.insert(
            decode_component(key),
            Value::String(decode_component(value)),
        );
    }
    map
}

/// Decode `+` and `%XX` escapes; malformed escapes pass through verbatim.
fn decode_component(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                (Some(high), Some(low)) => {
                    out.push((high << 4) | low);
                    i += 3;
                }
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}
