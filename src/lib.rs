//! Tile-component spatial model and decompress/compress scheduler for a
//! JPEG 2000 core: resolutions, sub-bands, precincts and code blocks
//! (`precinct`, `tile_component`), the per-component task-dependency
//! graph and worker-pool scheduler (`flow`, `scheduler`), the
//! multi-component transform (`mct`), wavelet lifting (`wavelet`), and
//! the thin facade tying them together (`codec`).
//!
//! T1 entropy coding, T2 packet parsing, JP2 box parsing, and file/stream
//! I/O are external collaborators: this crate only defines the trait
//! surface (`t1::T1Decoder`/`T1Encoder`, `stream::Stream`) and a minimal
//! reference parser (`codestream`) sufficient to drive its own tests,
//! not a conformant implementation of any of those.

mod chunked_array;
mod codec;
mod codestream;
mod error;
mod event;
mod flow;
mod geometry;
mod image;
mod math;
mod mct;
mod precinct;
mod scheduler;
mod shift;
mod simd;
mod sparse_buffer;
mod stream;
mod t1;
mod tagtree;
mod tile_component;
mod wavelet;
mod window_buffer;

pub use chunked_array::ChunkedArray;
pub use codec::{CodeBlockPayload, ComponentInput, Decoder, MctKind};
pub use codestream::{parse_cod, parse_siz, walk_tile_parts, CodingParams, ImageGeometry, TilePart};
pub use error::{CoreError, CoreResult};
pub use event::{EventKind, EventMgr, EventSink, LogSink};
pub use flow::{ImageComponentFlow, ResFlow};
pub use geometry::{Point, Rect};
pub use image::{ColorSpace, Component, Image};
pub use mct::{calculate_norms, decode_custom, decode_ict, decode_rct, encode_custom, encode_ict, encode_rct};
pub use precinct::{BandOrientation, BandWindow, Codeblock, Precinct};
pub use scheduler::{BlockJob, Executor};
pub use shift::ShiftInfo;
pub use sparse_buffer::SparseBuffer;
pub use stream::{SliceStream, Stream};
pub use t1::{CblkStyle, DecodeRequest, EncodeRequest, RawCoefficientCodec, T1Decoder, T1Encoder};
pub use tagtree::{BitIo, TagTree};
pub use tile_component::{Resolution, TileComponent};
pub use wavelet::{fdwt_53_2d, fdwt_97_2d, idwt_53_2d, idwt_97_2d, WaveletKind};
pub use window_buffer::WindowBuffer;
