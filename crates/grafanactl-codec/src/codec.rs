//! The `Codec` trait and its YAML/JSON implementations.

use grafanactl_resource::Resource;

use crate::error::{CodecError, Result};

/// A streaming encoder/decoder for one on-disk or wire format.
///
/// Implementations are registered in a `CodecRegistry` under a format name
/// (`yaml`, `json`, or a user-supplied custom name) and dispatched to by file
/// extension when reading a tree from disk.
pub trait Codec: Send + Sync {
    /// The format name, used as the `source` scheme annotation and as the
    /// output file extension.
    fn name(&self) -> &'static str;

    /// File extensions (without leading dot) this codec claims.
    fn extensions(&self) -> &'static [&'static str];

    fn decode(&self, bytes: &[u8]) -> Result<Resource>;

    fn encode(&self, resource: &Resource) -> Result<Vec<u8>>;

    /// May decode more than one document from a single byte stream
    /// (YAML's `---` multi-document convention). Default: exactly one.
    fn decode_all(&self, bytes: &[u8]) -> Result<Vec<Resource>> {
        Ok(vec![self.decode(bytes)?])
    }
}

/// `.yaml` / `.yml` codec.
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<Resource> {
        serde_yaml::from_slice(bytes).map_err(|e| CodecError::Decode {
            format: self.name().to_string(),
            source: Box::new(e),
        })
    }

    fn encode(&self, resource: &Resource) -> Result<Vec<u8>> {
        serde_yaml::to_string(resource)
            .map(String::into_bytes)
            .map_err(|e| CodecError::Encode {
                format: self.name().to_string(),
                source: Box::new(e),
            })
    }

    fn decode_all(&self, bytes: &[u8]) -> Result<Vec<Resource>> {
        let text = String::from_utf8_lossy(bytes);
        let mut resources = Vec::new();
        for doc in text.split("\n---") {
            let doc = doc.trim();
            if doc.is_empty() {
                continue;
            }
            resources.push(self.decode(doc.as_bytes())?);
        }
        Ok(resources)
    }
}

/// `.json` codec.
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<Resource> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            format: self.name().to_string(),
            source: Box::new(e),
        })
    }

    fn encode(&self, resource: &Resource) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(resource).map_err(|e| CodecError::Encode {
            format: self.name().to_string(),
            source: Box::new(e),
        })
    }
}

/// Base64-encode a binary field for embedding in a document.
pub fn encode_binary_field(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(data)
}

/// Decode a base64 field back into raw bytes.
pub fn decode_binary_field(field: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(field)
        .map_err(|e| CodecError::Decode {
            format: "base64".to_string(),
            source: Box::new(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Resource {
        let mut r = Resource::new("dashboard.grafana.app", "v1alpha1", "Dashboard");
        r.metadata.name = Some("foo".into());
        r
    }

    #[test]
    fn yaml_round_trip() {
        let codec = YamlCodec;
        let encoded = codec.encode(&sample()).unwrap();
        let decoded = codec.decode(&encoded).unwrap();
        assert_eq!(decoded.name(), Some("foo"));
    }

    #[test]
    fn json_round_trip() {
        let codec = JsonCodec;
        let encoded = codec.encode(&sample()).unwrap();
        let decoded = codec.decode(&encoded).unwrap();
        assert_eq!(decoded.name(), Some("foo"));
    }

    #[test]
    fn yaml_decode_all_splits_documents() {
        let codec = YamlCodec;
        let one = codec.encode(&sample()).unwrap();
        let mut joined = one.clone();
        joined.extend_from_slice(b"\n---\n");
        joined.extend_from_slice(&one);
        let docs = codec.decode_all(&joined).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn base64_round_trip() {
        let encoded = encode_binary_field(b"hello");
        let decoded = decode_binary_field(&encoded).unwrap();
        assert_eq!(decoded, b"hello");
    }
}
