use serde_json::Value;

use crate::error::QueryError;

/// Opaque continuation token for partial scans.
///
/// Wraps whatever structured value the storage collaborator returned as its
/// last-evaluated key. The engines never inspect or mutate the contents; the
/// token only round-trips between the store and the client. Transport format
/// is JSON serialized then percent-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor(Value);

impl Cursor {
    pub fn new(key: Value) -> Self {
        Self(key)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Serialize for URL transport.
    pub fn encode(&self) -> String {
        urlencoding::encode(&self.0.to_string()).into_owned()
    }

    /// Decode a client-supplied token: URL-decode, then JSON-parse. Failure
    /// of either step is a `DecodeCursor` error.
    pub fn decode(raw: &str) -> Result<Self, QueryError> {
        let decoded = urlencoding::decode(raw).map_err(|e| QueryError::DecodeCursor {
            message: e.to_string(),
        })?;
        let value = serde_json::from_str(&decoded).map_err(|e| QueryError::DecodeCursor {
            message: e.to_string(),
        })?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let key = json!({"sort_key": "TS#2025-01-01T12:00:00+00:00#ET#alert#FLOW#1#EID#ab"});
        let cursor = Cursor::new(key.clone());
        let token = cursor.encode();
        // Token must be URL-safe as-is
        assert!(!token.contains('{') && !token.contains('"'));
        let decoded = Cursor::decode(&token).unwrap();
        assert_eq!(decoded.into_inner(), key);
    }

    #[test]
    fn test_round_trip_preserves_arbitrary_shapes() {
        // The token is uninterpreted; any store-defined shape must survive
        let key = json!({"pk": "tenant-a", "sk": {"nested": [1, 2, 3]}});
        let decoded = Cursor::decode(&Cursor::new(key.clone()).encode()).unwrap();
        assert_eq!(decoded.into_inner(), key);
    }

    #[test]
    fn test_corrupted_token_is_decode_error() {
        // Truncated percent-encoded JSON
        let token = Cursor::new(json!({"sort_key": "abc"})).encode();
        let truncated = &token[..token.len() / 2];
        assert!(matches!(
            Cursor::decode(truncated),
            Err(QueryError::DecodeCursor { .. })
        ));

        assert!(matches!(
            Cursor::decode("not-json-at-all"),
            Err(QueryError::DecodeCursor { .. })
        ));
    }
}
