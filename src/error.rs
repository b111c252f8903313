//! Error taxonomy for the tile codec core (spec §7).
//!
//! The teacher crate represents failure as `OPJ_BOOL` plus side-channel
//! messages written through `opj_event_mgr` (see the absent-from-this-pack
//! `event.rs`/`j2k.rs`). Per the "exception/boolean-driven control flow"
//! redesign note, this crate instead returns `Result<_, CoreError>`
//! end-to-end; `thiserror` is the sibling JPEG-2000 example
//! `rad-medica-jpegexp-rs`'s choice for exactly this, so it's pulled in here
//! rather than hand-rolling `Display`/`Error` impls.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
  /// Resolution/precinct/code-block arithmetic would overflow 32 bits.
  #[error("geometry overflow computing {what}")]
  GeometryOverflow { what: &'static str },

  /// A sparse buffer, tag tree, or code-block buffer could not allocate.
  #[error("allocation failed: {what}")]
  AllocationFailed { what: &'static str },

  /// `SparseBuffer::alloc` could not materialize a sub-tile for the region.
  #[error("sparse buffer allocation failed for region ({x0},{y0})-({x1},{y1})")]
  SparseBufferAlloc { x0: u32, y0: u32, x1: u32, y1: u32 },

  /// A single code block's T1 entropy decode failed. The tile aborts but
  /// the decoder/codec remains usable for subsequent tiles (§7).
  #[error("T1 decode failed for code block at ({x},{y}) resolution {resno}")]
  T1DecodeFailed { x: u32, y: u32, resno: u8 },

  /// Unexpected end of stream inside a marker segment.
  #[error("truncated codestream: expected {needed} more bytes, got {available}")]
  TruncatedStream { needed: usize, available: usize },

  /// JP2 box structure is inconsistent (out-of-scope collaborator surface;
  /// kept only so the codec facade has something to propagate).
  #[error("corrupt container box: {0}")]
  CorruptContainerBox(String),

  /// Zero-`TNsot` sentinel: move on to the next tile.
  #[error("next-tile SOT sentinel encountered")]
  NextTileSot,

  /// An unknown/unsupported marker was hit where EOC or SOT was expected;
  /// signals a graceful tile-part termination, not a hard error.
  #[error("unknown marker encountered while ending tile-part")]
  MarkerUnknown,

  /// A fast/plugin T1 decode path was unavailable; caller should fall back
  /// to the software implementation in this crate.
  #[error("plugin decode unsupported for this configuration")]
  PluginDecodeUnsupported,

  /// The wavelet or MCT stage failed outright; this aborts the whole tile
  /// (unlike a T1 failure, which is block-local).
  #[error("wavelet/MCT stage failed: {0}")]
  TransformFailed(String),

  /// The worker-pool executor could not be built for the requested worker
  /// count (spec §5's `Executor`).
  #[error("failed to initialize scheduler thread pool: {reason}")]
  SchedulerInit { reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
