//! Codestream byte source/sink (spec §1: file/stream I/O, including
//! io_uring-backed streams, is an external collaborator; this crate only
//! needs the narrow read/seek surface below). Grounded on the teacher's
//! `opj_stream_t`, which wraps a user-supplied read/skip/seek callback
//! triple — here expressed as a plain trait instead of three raw
//! function pointers plus a `c_void` context.

pub trait Stream {
  /// Reads up to `buf.len()` bytes, returning the number read (`0` at
  /// end of stream). Mirrors `opj_stream_read_fn`.
  fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

  /// Advances the stream position by `n` bytes without reading them,
  /// when the underlying source supports it cheaply. Mirrors
  /// `opj_stream_skip_fn`.
  fn skip(&mut self, n: u64) -> std::io::Result<u64>;

  /// Seeks to an absolute byte offset. Mirrors `opj_stream_seek_fn`.
  fn seek(&mut self, pos: u64) -> std::io::Result<()>;

  fn len(&self) -> Option<u64>;
}

/// A `Stream` over an in-memory buffer, used by this crate's own tests
/// (and suitable as a minimal reference implementation for callers that
/// already have the whole codestream in memory).
pub struct SliceStream<'a> {
  data: &'a [u8],
  pos: usize,
}

impl<'a> SliceStream<'a> {
  pub fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }
}

impl<'a> Stream for SliceStream<'a> {
  fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
    let n = buf.len().min(self.data.len().saturating_sub(self.pos));
    buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
    self.pos += n;
    Ok(n)
  }

  fn skip(&mut self, n: u64) -> std::io::Result<u64> {
    let n = (n as usize).min(self.data.len().saturating_sub(self.pos));
    self.pos += n;
    Ok(n as u64)
  }

  fn seek(&mut self, pos: u64) -> std::io::Result<()> {
    self.pos = (pos as usize).min(self.data.len());
    Ok(())
  }

  fn len(&self) -> Option<u64> {
    Some(self.data.len() as u64)
  }
}
