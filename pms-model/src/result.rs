use serde_json::Value;

use crate::headers::HeaderSet;

/// Normalized outcome of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    pub body: Value,
    pub headers: HeaderSet,
    pub status_code: u16,
}

impl ApiResult {
    pub fn new(body: Value, headers: HeaderSet, status_code: u16) -> Self {
        Self {
            body,
            headers,
            status_code,
        }
    }

    /// Deserializes the body into a typed value.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.body)
    }
}

/// Parses a response payload: an empty payload is `null`, anything that is
/// not JSON is kept as a JSON string.
pub fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"  \n"), Value::Null);
        assert_eq!(parse_body(br#"{"id": 3}"#), json!({"id": 3}));
        assert_eq!(parse_body(b"<html>oops</html>"), json!("<html>oops</html>"));
    }

    #[test]
    fn test_typed_body() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Page {
            count: u32,
        }
        let r = ApiResult::new(json!({"count": 2, "results": []}), HeaderSet::new(), 200);
        assert_eq!(r.json::<Page>().unwrap(), Page { count: 2 });
    }
}
