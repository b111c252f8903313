//! Minimal JPEG 2000 codestream marker walker (spec §1: T2 packet
//! parsing and full marker-segment decoding are external collaborators;
//! this module only reads the handful of fields this crate's own tests
//! need to build a `TileComponent` pyramid and locate tile-part payload
//! bytes — SIZ's image/tile geometry, COD's resolution/code-block/
//! precinct parameters, and SOT/SOD's tile-part framing).
//!
//! Grounded on the teacher's marker constants (`j2k.rs`'s `J2K_MS_*`,
//! not present in this retrieval pack but standard across every J2K
//! implementation) and `byteorder`'s big-endian reads, which is how the
//! teacher's `cio.rs` reads codestream marker segments.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::CoreError;
use crate::geometry::{Point, Rect};
use crate::t1::CblkStyle;
use crate::wavelet::WaveletKind;

pub const MARKER_SOC: u16 = 0xFF4F;
pub const MARKER_SIZ: u16 = 0xFF51;
pub const MARKER_COD: u16 = 0xFF52;
pub const MARKER_QCD: u16 = 0xFF5C;
pub const MARKER_SOT: u16 = 0xFF90;
pub const MARKER_SOD: u16 = 0xFF93;
pub const MARKER_EOC: u16 = 0xFFD9;

#[derive(Debug, Clone)]
pub struct ImageGeometry {
  pub rect: Rect,
  pub num_comps: u32,
  pub comp_prec: Vec<u32>,
  pub comp_sgnd: Vec<bool>,
}

#[derive(Debug, Clone)]
pub struct CodingParams {
  pub num_resolutions: u32,
  pub cblk_expn: Point,
  pub prec_expn: Point,
  pub wavelet: WaveletKind,
  pub cblk_sty: CblkStyle,
}

#[derive(Debug, Clone)]
pub struct TilePart {
  pub tile_index: u16,
  pub payload: std::ops::Range<usize>,
}

fn need(cursor: &Cursor<&[u8]>, n: u64) -> Result<(), CoreError> {
  let remaining = (cursor.get_ref().len() as u64).saturating_sub(cursor.position());
  if remaining < n {
    return Err(CoreError::TruncatedStream {
      needed: n as usize,
      available: remaining as usize,
    });
  }
  Ok(())
}

/// Reads the SIZ marker segment body (already positioned just past the
/// 2-byte length field). Only the fields this crate's tests need are
/// extracted; tile-partitioning geometry (`tx0`/`ty0`/`tdx`/`tdy`) is
/// intentionally not modeled since this crate works one tile-component
/// at a time.
pub fn parse_siz(cursor: &mut Cursor<&[u8]>) -> Result<ImageGeometry, CoreError> {
  need(cursor, 2 + 16 + 2)?;
  let _rsiz = cursor.read_u16::<BigEndian>().unwrap();
  let xsiz = cursor.read_u32::<BigEndian>().unwrap();
  let ysiz = cursor.read_u32::<BigEndian>().unwrap();
  let xosiz = cursor.read_u32::<BigEndian>().unwrap();
  let yosiz = cursor.read_u32::<BigEndian>().unwrap();
  // tile geometry fields (txsiz/tysiz/txosiz/tyosiz) are skipped: 16 bytes
  need(cursor, 16)?;
  for _ in 0..4 {
    cursor.read_u32::<BigEndian>().unwrap();
  }
  let csiz = cursor.read_u16::<BigEndian>().unwrap() as u32;
  let mut comp_prec = Vec::with_capacity(csiz as usize);
  let mut comp_sgnd = Vec::with_capacity(csiz as usize);
  need(cursor, csiz as u64 * 3)?;
  for _ in 0..csiz {
    let ssiz = cursor.read_u8().unwrap();
    let _xrsiz = cursor.read_u8().unwrap();
    let _yrsiz = cursor.read_u8().unwrap();
    comp_sgnd.push(ssiz & 0x80 != 0);
    comp_prec.push((ssiz & 0x7f) as u32 + 1);
  }
  Ok(ImageGeometry {
    rect: Rect::new(xosiz, yosiz, xsiz, ysiz),
    num_comps: csiz,
    comp_prec,
    comp_sgnd,
  })
}

/// Reads the COD marker segment body, extracting resolution count,
/// code-block size exponents, and precinct size exponents (or the
/// default maximal precinct when `SPcod`'s "use default" bit is set, per
/// Annex A.6.1).
pub fn parse_cod(cursor: &mut Cursor<&[u8]>) -> Result<CodingParams, CoreError> {
  need(cursor, 1 + 2 + 1 + 4 + 1)?;
  let scod = cursor.read_u8().unwrap();
  let _prog_layers = cursor.read_u16::<BigEndian>().unwrap();
  let _mct = cursor.read_u8().unwrap();
  let num_decomp_levels = cursor.read_u8().unwrap();
  let cblk_w_expn = cursor.read_u8().unwrap() + 2;
  let cblk_h_expn = cursor.read_u8().unwrap() + 2;
  let cblk_sty = CblkStyle::from_bits_truncate(cursor.read_u8().unwrap());
  let qmfbid = cursor.read_u8().unwrap();
  let wavelet = if qmfbid == 1 {
    WaveletKind::Reversible53
  } else {
    WaveletKind::Irreversible97
  };
  let (prec_w, prec_h) = if scod & 0x01 != 0 {
    need(cursor, num_decomp_levels as u64 + 1)?;
    let mut last = (15u8, 15u8);
    for _ in 0..=num_decomp_levels {
      let b = cursor.read_u8().unwrap();
      last = (b & 0x0f, (b >> 4) & 0x0f);
    }
    last
  } else {
    (15, 15)
  };
  Ok(CodingParams {
    num_resolutions: num_decomp_levels as u32 + 1,
    cblk_expn: Point::new(cblk_w_expn as u32, cblk_h_expn as u32),
    prec_expn: Point::new(prec_w as u32, prec_h as u32),
    wavelet,
    cblk_sty,
  })
}

/// Walks SOT/SOD pairs, returning the byte range of every tile-part's
/// compressed payload. Stops at EOC or end of buffer. This is
/// deliberately not a full T2 packet parser (out of scope per spec
/// §1) — it exists only to let this crate's integration tests locate
/// tile-part bytes to hand to a `T1Decoder`.
pub fn walk_tile_parts(data: &[u8]) -> Result<Vec<TilePart>, CoreError> {
  let mut parts = Vec::new();
  let mut cursor = Cursor::new(data);
  loop {
    if cursor.position() as usize + 2 > data.len() {
      break;
    }
    let marker = cursor.read_u16::<BigEndian>().unwrap();
    match marker {
      MARKER_EOC => break,
      MARKER_SOC | MARKER_SIZ | MARKER_COD | MARKER_QCD => {
        // skip length-prefixed segment
        need(&cursor, 2)?;
        let len = cursor.read_u16::<BigEndian>().unwrap() as u64;
        if marker == MARKER_SOC {
          continue;
        }
        need(&cursor, len - 2)?;
        cursor.set_position(cursor.position() + len - 2);
      }
      MARKER_SOT => {
        // `marker` was already consumed; the SOT segment (including its
        // own marker bytes) starts 2 bytes back from here.
        let sot_marker_pos = cursor.position() as usize - 2;
        need(&cursor, 2)?;
        let _len = cursor.read_u16::<BigEndian>().unwrap();
        need(&cursor, 6)?;
        let tile_index = cursor.read_u16::<BigEndian>().unwrap();
        let psot = cursor.read_u32::<BigEndian>().unwrap();
        let _tpsot = cursor.read_u8().unwrap();
        let _tnsot = cursor.read_u8().unwrap();
        // scan forward to SOD
        loop {
          need(&cursor, 2)?;
          let next = cursor.read_u16::<BigEndian>().unwrap();
          if next == MARKER_SOD {
            break;
          }
          need(&cursor, 2)?;
          let seg_len = cursor.read_u16::<BigEndian>().unwrap() as u64;
          need(&cursor, seg_len - 2)?;
          cursor.set_position(cursor.position() + seg_len - 2);
        }
        let payload_start = cursor.position() as usize;
        let tile_part_end = if psot == 0 {
          data.len()
        } else {
          (sot_marker_pos + psot as usize).min(data.len())
        };
        parts.push(TilePart {
          tile_index,
          payload: payload_start..tile_part_end,
        });
        cursor.set_position(tile_part_end as u64);
      }
      _ => {
        need(&cursor, 2)?;
        let len = cursor.read_u16::<BigEndian>().unwrap() as u64;
        need(&cursor, len.saturating_sub(2))?;
        cursor.set_position(cursor.position() + len - 2);
      }
    }
  }
  Ok(parts)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn push_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_be_bytes());
  }
  fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
  }

  #[test]
  fn parse_siz_reads_geometry_and_components() {
    let mut buf = Vec::new();
    push_u16(&mut buf, 0); // Rsiz
    push_u32(&mut buf, 64); // Xsiz
    push_u32(&mut buf, 48); // Ysiz
    push_u32(&mut buf, 0); // XOsiz
    push_u32(&mut buf, 0); // YOsiz
    push_u32(&mut buf, 64); // XTsiz
    push_u32(&mut buf, 48); // YTsiz
    push_u32(&mut buf, 0); // XTOsiz
    push_u32(&mut buf, 0); // YTOsiz
    push_u16(&mut buf, 3); // Csiz
    for _ in 0..3 {
      buf.push(7); // Ssiz: unsigned, 8-bit
      buf.push(1);
      buf.push(1);
    }
    let mut cursor = Cursor::new(buf.as_slice());
    let geom = parse_siz(&mut cursor).unwrap();
    assert_eq!(geom.rect, Rect::new(0, 0, 64, 48));
    assert_eq!(geom.num_comps, 3);
    assert_eq!(geom.comp_prec, vec![8, 8, 8]);
    assert!(geom.comp_sgnd.iter().all(|&s| !s));
  }

  #[test]
  fn parse_cod_reads_resolutions_and_wavelet_kind() {
    let mut buf = Vec::new();
    buf.push(0); // Scod: no custom precincts
    push_u16(&mut buf, 1); // layers
    buf.push(0); // MCT
    buf.push(3); // decomposition levels -> 4 resolutions
    buf.push(4); // cblk width exponent (stored - 2)
    buf.push(4); // cblk height exponent
    buf.push(0x08); // cblk style: vertically causal context
    buf.push(1); // qmfbid: reversible
    let mut cursor = Cursor::new(buf.as_slice());
    let cp = parse_cod(&mut cursor).unwrap();
    assert_eq!(cp.num_resolutions, 4);
    assert_eq!(cp.cblk_expn, Point::new(6, 6));
    assert_eq!(cp.wavelet, WaveletKind::Reversible53);
    assert_eq!(cp.cblk_sty, CblkStyle::VERT_CAUSAL_CTX);
  }

  #[test]
  fn truncated_siz_is_an_error() {
    let buf = vec![0u8; 4];
    let mut cursor = Cursor::new(buf.as_slice());
    assert!(parse_siz(&mut cursor).is_err());
  }

  #[test]
  fn walk_tile_parts_finds_one_tile_part_payload() {
    let mut buf = Vec::new();
    push_u16(&mut buf, MARKER_SOC);
    let payload = [0xAAu8, 0xBB, 0xCC, 0xDD];
    push_u16(&mut buf, MARKER_SOT);
    push_u16(&mut buf, 10); // Lsot
    push_u16(&mut buf, 0); // Isot (tile index)
    let sot_marker_pos = 2u32; // position of the SOT marker itself
    let psot = 12 + 2 + payload.len() as u32; // SOT segment(12, incl. marker) + SOD marker(2) + payload
    push_u32(&mut buf, psot);
    buf.push(0); // TPsot
    buf.push(1); // TNsot
    push_u16(&mut buf, MARKER_SOD);
    buf.extend_from_slice(&payload);
    push_u16(&mut buf, MARKER_EOC);
    let _ = sot_marker_pos;

    let parts = walk_tile_parts(&buf).unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].tile_index, 0);
    assert_eq!(&buf[parts[0].payload.clone()], &payload);
  }
}
