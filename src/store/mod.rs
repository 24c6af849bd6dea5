mod bytes;
mod compression;
mod error;
mod file;
mod header;
mod node;
mod record;

/// Compression detection result and payload filters.
pub use compression::{Compression, MAX_DECOMPRESSED_BYTES};
/// Error and result aliases.
pub use error::{Result, StoreError};
/// Container file abstraction and node statistics.
pub use file::{Container, ContainerStats, DEFAULT_MAX_PARSE_DEPTH};
/// File header representation.
pub use header::ContainerHeader;
/// Group/dataset/attribute tree.
pub use node::{Attr, Attrs, Buffer, Dataset, DatasetOptions, Dtype, Group, Node};
