//! Spec §8 scenario 6: a truncated codestream must fail cleanly with a
//! `TruncatedStream` error, and the same parsing path must still succeed
//! on the full buffer afterwards — the marker walker holds no state
//! across calls that a failed attempt could leave poisoned.

use std::io::Cursor;

use j2k_core::{parse_cod, parse_siz, walk_tile_parts, CoreError};

fn push_u16(buf: &mut Vec<u8>, v: u16) {
  buf.extend_from_slice(&v.to_be_bytes());
}
fn push_u32(buf: &mut Vec<u8>, v: u32) {
  buf.extend_from_slice(&v.to_be_bytes());
}

const MARKER_SOC: u16 = 0xFF4F;
const MARKER_SOT: u16 = 0xFF90;
const MARKER_SOD: u16 = 0xFF93;
const MARKER_EOC: u16 = 0xFFD9;

fn full_codestream() -> (Vec<u8>, Vec<u8>) {
  let mut buf = Vec::new();
  push_u16(&mut buf, MARKER_SOC);

  let payload = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66];
  push_u16(&mut buf, MARKER_SOT);
  push_u16(&mut buf, 10); // Lsot
  push_u16(&mut buf, 0); // Isot
  let psot = 12 + 2 + payload.len() as u32;
  push_u32(&mut buf, psot);
  buf.push(0); // TPsot
  buf.push(1); // TNsot
  push_u16(&mut buf, MARKER_SOD);
  buf.extend_from_slice(&payload);
  push_u16(&mut buf, MARKER_EOC);

  (buf, payload.to_vec())
}

#[test]
fn truncated_stream_errors_then_full_stream_recovers() {
  let (full, payload) = full_codestream();
  // cut right after the SOT marker bytes, before its length field — the
  // walker must fail the moment it tries to read past the buffer rather
  // than silently clamping.
  let truncated = &full[..4];

  let err = walk_tile_parts(truncated).unwrap_err();
  assert!(matches!(err, CoreError::TruncatedStream { .. }));

  let parts = walk_tile_parts(&full).unwrap();
  assert_eq!(parts.len(), 1);
  assert_eq!(&full[parts[0].payload.clone()], payload.as_slice());
}

#[test]
fn truncated_siz_and_cod_segments_error_without_wedging_the_parser() {
  let mut siz = Vec::new();
  push_u16(&mut siz, 0);
  push_u32(&mut siz, 12);
  // stop well short of Csiz and the component table
  let mut cursor = Cursor::new(siz.as_slice());
  assert!(matches!(parse_siz(&mut cursor).unwrap_err(), CoreError::TruncatedStream { .. }));

  let mut cod = Vec::new();
  cod.push(0);
  push_u16(&mut cod, 1);
  // stop before num_decomp_levels/cblk fields
  let mut cursor = Cursor::new(cod.as_slice());
  assert!(matches!(parse_cod(&mut cursor).unwrap_err(), CoreError::TruncatedStream { .. }));

  // the same functions still succeed given complete input afterwards.
  let mut full_siz = Vec::new();
  push_u16(&mut full_siz, 0);
  push_u32(&mut full_siz, 12);
  push_u32(&mut full_siz, 12);
  push_u32(&mut full_siz, 0);
  push_u32(&mut full_siz, 0);
  push_u32(&mut full_siz, 12);
  push_u32(&mut full_siz, 12);
  push_u32(&mut full_siz, 0);
  push_u32(&mut full_siz, 0);
  push_u16(&mut full_siz, 1);
  full_siz.push(7);
  full_siz.push(1);
  full_siz.push(1);
  let mut cursor = Cursor::new(full_siz.as_slice());
  assert!(parse_siz(&mut cursor).is_ok());
}
