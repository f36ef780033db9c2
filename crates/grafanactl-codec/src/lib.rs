//! Pluggable encoders/decoders for resource documents: YAML, JSON, and
//! user-registered custom codecs, dispatched by file extension.

pub mod codec;
pub mod error;
pub mod registry;

pub use codec::{decode_binary_field, encode_binary_field, Codec, JsonCodec, YamlCodec};
pub use error::{CodecError, Result};
pub use registry::CodecRegistry;
