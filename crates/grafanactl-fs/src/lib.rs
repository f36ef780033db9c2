//! Filesystem reader/writer: a parallel, codec-dispatching tree walk and a
//! kind-grouped writer, coupling the resource model to the on-disk layout.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{FsError, Result};
pub use reader::{read_tree, ReadOptions};
pub use writer::{write_tree, GroupByKind, Namer, WriteOptions};
