//! A table of codecs keyed by format name, dispatched by file extension.

use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::{Codec, JsonCodec, YamlCodec};
use crate::error::{CodecError, Result};

/// Registry of codecs, dispatched by file extension on read and by format
/// name on write.
#[derive(Clone)]
pub struct CodecRegistry {
    by_extension: HashMap<&'static str, Arc<dyn Codec>>,
    by_name: HashMap<&'static str, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// An empty registry with no codecs.
    pub fn empty() -> Self {
        Self {
            by_extension: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// The default registry: YAML and JSON.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(YamlCodec));
        registry.register(Arc::new(JsonCodec));
        registry
    }

    /// Register a codec, including any user-supplied custom codec.
    pub fn register(&mut self, codec: Arc<dyn Codec>) {
        for ext in codec.extensions() {
            self.by_extension.insert(ext, Arc::clone(&codec));
        }
        self.by_name.insert(codec.name(), codec);
    }

    /// Look up a codec by the extension of a path (without leading dot).
    pub fn by_extension(&self, extension: &str) -> Result<Arc<dyn Codec>> {
        self.by_extension
            .get(extension)
            .cloned()
            .ok_or_else(|| CodecError::UnrecognisedFormat(extension.to_string()))
    }

    /// Look up a codec by its registered format name (e.g. for the writer's
    /// chosen output format).
    pub fn by_name(&self, name: &str) -> Result<Arc<dyn Codec>> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| CodecError::UnknownFormat(name.to_string()))
    }

    /// Look up a codec for a filesystem path by its extension.
    pub fn for_path(&self, path: &std::path::Path) -> Result<Arc<dyn Codec>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| CodecError::UnrecognisedFormat(path.display().to_string()))?;
        self.by_extension(extension)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn dispatches_by_extension() {
        let registry = CodecRegistry::with_defaults();
        assert_eq!(registry.for_path(Path::new("Dashboard/foo.yaml")).unwrap().name(), "yaml");
        assert_eq!(registry.for_path(Path::new("Dashboard/foo.yml")).unwrap().name(), "yaml");
        assert_eq!(registry.for_path(Path::new("Dashboard/foo.json")).unwrap().name(), "json");
    }

    #[test]
    fn unrecognised_extension_errors() {
        let registry = CodecRegistry::with_defaults();
        assert!(matches!(
            registry.for_path(Path::new("Dashboard/foo.toml")),
            Err(CodecError::UnrecognisedFormat(_))
        ));
    }

    #[test]
    fn by_name_finds_registered_format() {
        let registry = CodecRegistry::with_defaults();
        assert_eq!(registry.by_name("json").unwrap().name(), "json");
        assert!(matches!(registry.by_name("toml"), Err(CodecError::UnknownFormat(_))));
    }
}
