//! T1 entropy coder interface (spec §1: T1 is an external collaborator,
//! referenced here only through the trait surface this crate needs — no
//! MQ-coder state machine, context models, or bit-plane pass loops are
//! implemented). Trait and method names are grounded on the teacher's
//! `t1.rs` (`opj_t1_t`, `opj_t1_decode_cblks`/`opj_t1_encode_cblks`,
//! per-block `numbps`), kept as the shape callers code against while the
//! actual entropy coding is left to whatever implementation the caller
//! plugs in.

use bitflags::bitflags;

use crate::geometry::Rect;

bitflags! {
  /// `SPcod`/`SPcoc`'s code-block style bits (COD/COC marker, Table A.19),
  /// carried alongside a block's payload so a `T1Decoder`/`T1Encoder`
  /// knows which entropy-coding variants apply without this crate having
  /// to understand MQ-coding itself.
  #[derive(Default)]
  pub struct CblkStyle: u8 {
    const LAZY_ARITH_BYPASS = 0x01;
    const RESET_CONTEXT     = 0x02;
    const TERM_ON_EACH_PASS = 0x04;
    const VERT_CAUSAL_CTX   = 0x08;
    const PRED_TERM         = 0x10;
    const SEG_SYMBOLS       = 0x20;
  }
}

/// What a code-block decode needs from an external T1 decoder: the
/// compressed payload plus enough side information (`numbps`, code-block
/// style flags, ROI shift) to reconstruct a coefficient plane. Mirrors
/// `opj_t1_decode_cblks`'s per-block inputs.
pub struct DecodeRequest<'a> {
  pub data: &'a [u8],
  pub rect: Rect,
  pub numbps: u8,
  pub cblk_sty: CblkStyle,
  pub roishift: i32,
}

pub trait T1Decoder {
  /// Decodes one code block into `out` (row-major, `rect.width() *
  /// rect.height()` signed-magnitude coefficients). Returns `false` on a
  /// corrupt/unsupported block, matching `opj_t1_decode_cblks`'s
  /// per-block failure that the scheduler turns into a block-local
  /// `CoreError::T1DecodeFailed` rather than aborting the whole tile.
  fn decode(&mut self, req: DecodeRequest<'_>, out: &mut [i32]) -> bool;
}

pub struct EncodeRequest<'a> {
  pub coefficients: &'a [i32],
  pub rect: Rect,
  pub cblk_sty: CblkStyle,
}

pub trait T1Encoder {
  /// Encodes one code block's coefficients, returning the compressed
  /// payload and the block's `numbps` (significant bit-plane count),
  /// mirroring `opj_t1_encode_cblks`'s outputs.
  fn encode(&mut self, req: EncodeRequest<'_>) -> (Vec<u8>, u8);
}

/// A minimal, non-bit-exact reference codec used to drive this crate's
/// own end-to-end tests (spec §8) without a real MQ arithmetic coder:
/// each coefficient is stored as a fixed-width little-endian `i32`. It
/// satisfies the `T1Decoder`/`T1Encoder` contract and round-trips
/// exactly, but produces no JPEG-2000-compliant codestream and is not a
/// substitute for a real T1 implementation.
#[derive(Clone, Copy)]
pub struct RawCoefficientCodec;

impl T1Decoder for RawCoefficientCodec {
  fn decode(&mut self, req: DecodeRequest<'_>, out: &mut [i32]) -> bool {
    let n = (req.rect.width() as usize) * (req.rect.height() as usize);
    if out.len() != n || req.data.len() != n * 4 {
      return false;
    }
    for (i, chunk) in req.data.chunks_exact(4).enumerate() {
      out[i] = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    true
  }
}

impl T1Encoder for RawCoefficientCodec {
  fn encode(&mut self, req: EncodeRequest<'_>) -> (Vec<u8>, u8) {
    let mut data = Vec::with_capacity(req.coefficients.len() * 4);
    let mut max_abs: u32 = 0;
    for &v in req.coefficients {
      data.extend_from_slice(&v.to_le_bytes());
      max_abs = max_abs.max(v.unsigned_abs());
    }
    let numbps = 32 - max_abs.leading_zeros();
    (data, numbps as u8)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_codec_round_trips() {
    let rect = Rect::new(0, 0, 4, 4);
    let coeffs: Vec<i32> = (0..16).map(|v| v * 3 - 20).collect();
    let mut codec = RawCoefficientCodec;
    let (data, numbps) = codec.encode(EncodeRequest {
      coefficients: &coeffs,
      rect,
      cblk_sty: CblkStyle::empty(),
    });
    assert!(numbps > 0);
    let mut out = vec![0i32; 16];
    let ok = codec.decode(
      DecodeRequest {
        data: &data,
        rect,
        numbps,
        cblk_sty: CblkStyle::empty(),
        roishift: 0,
      },
      &mut out,
    );
    assert!(ok);
    assert_eq!(out, coeffs);
  }

  #[test]
  fn decode_rejects_mismatched_buffer_size() {
    let rect = Rect::new(0, 0, 4, 4);
    let mut codec = RawCoefficientCodec;
    let mut out = vec![0i32; 16];
    let ok = codec.decode(
      DecodeRequest {
        data: &[0u8; 4],
        rect,
        numbps: 1,
        cblk_sty: CblkStyle::empty(),
        roishift: 0,
      },
      &mut out,
    );
    assert!(!ok);
  }
}
