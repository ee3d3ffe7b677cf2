//! btreeidx - a single-file, disk-resident B-Tree index
//!
//! Maps 64-bit unsigned keys to 64-bit unsigned values in a flat file, one
//! B-Tree node per fixed-size block. The file itself is the entire index;
//! there is no separate journal, no secondary index, and no in-memory
//! structure that is not reconstructible from the file alone.
//!
//! ## Disk layout
//!
//! ```text
//! Block 0:        Header (magic, root_block_id, next_block_id)
//! Block 1..N:     Nodes, one per block, allocated in order as the tree
//!                 grows. A node is a leaf iff its first child slot is 0.
//! ```
//!
//! All multi-byte integers are stored big-endian. Every block is exactly
//! [`node::BLOCK_SIZE`] bytes; block `b` lives at byte offset
//! `b * BLOCK_SIZE`.
//!
//! ## Module map
//!
//! - [`block`] — endian codec and raw block I/O.
//! - [`header`] — the block-0 file header codec.
//! - [`node`] — the node entity, its codec, and the layout constants.
//! - [`cache`] — the bounded FIFO node cache.
//! - [`tree`] — search, proactive-split insert, validation, traversal.
//! - [`index`] — [`index::BTreeIndex`], the owned file handle tying the
//!   above together: `create`/`open`/`close`.
//! - [`bulk`] — the `key,value` text format used by `load`/`extract`.
//! - [`error`] — the [`error::BTreeError`] taxonomy shared by every module.
//!
//! This crate implements the engine only. The interactive front-end lives
//! in the separate `btreeidx-cli` binary, which depends on this crate the
//! same way `mkfs.wfs` depends on `wfs-common`.

pub mod block;
pub mod bulk;
pub mod cache;
pub mod error;
pub mod header;
pub mod index;
pub mod node;
pub mod tree;

pub use error::{BTreeError, Result};
pub use index::BTreeIndex;
pub use node::{BLOCK_SIZE, MAGIC, MAX_CHILDREN, MAX_KEYS, MIN_KEYS_NONROOT};
