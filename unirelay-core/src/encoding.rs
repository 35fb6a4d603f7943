//! JSON encoding for outbound payloads, plus lenient decoding helpers for
//! inbound ones

use crate::error::RelayError;
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};

/// Serialize to compact JSON bytes.
///
/// `serde_json` never HTML-escapes, so URLs and base64 in the output keep
/// `<`, `>` and `&` byte-for-byte.
pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Bytes, RelayError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| RelayError::Conversion(format!("marshal payload failed: {e}")))
}

/// `deserialize_with` helper: an explicit JSON `null` decodes like a missing
/// key. Pair with `#[serde(default)]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Wire {
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<u32>,
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
        #[serde(default, deserialize_with = "null_as_default")]
        created: i64,
    }

    #[test]
    fn null_fields_decode_as_defaults() {
        let w: Wire = serde_json::from_str(r#"{"items":null,"name":null,"created":null}"#).unwrap();
        assert!(w.items.is_empty());
        assert_eq!(w.name, "");
        assert_eq!(w.created, 0);

        let w: Wire = serde_json::from_str(r#"{"items":[1,2],"name":"n","created":5}"#).unwrap();
        assert_eq!(w.items, vec![1, 2]);
        assert_eq!(w.name, "n");
        assert_eq!(w.created, 5);

        let w: Wire = serde_json::from_str("{}").unwrap();
        assert!(w.items.is_empty());
    }

    #[test]
    fn special_characters_are_not_html_escaped() {
        let url = "https://cdn.example.com/v.mp4?a=1&b=<2>";
        let bytes = to_json_bytes(&json!({ "url": url })).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains(url));
        assert!(!text.contains("\\u0026"));
        assert!(!text.contains("\\u003c"));
    }
}
