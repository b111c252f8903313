//! Shared forward-encode harness for the end-to-end tests (spec §8). The
//! crate's public facade (`Decoder`) only exposes the decompress
//! direction, matching §6's public API surface; these tests build the
//! compressed side directly out of the library's own building blocks
//! (`TileComponent`, `fdwt_*_2d`, `RawCoefficientCodec`) the same way
//! `codec.rs`'s `decode_component` consumes them in reverse, so a
//! round trip exercises the real wavelet/T1/MCT/shift code paths
//! instead of a stand-in.

#![allow(dead_code)]

use j2k_core::{
  BandOrientation, BandWindow, CblkStyle, CodeBlockPayload, CodingParams, ComponentInput, EncodeRequest, Point,
  RawCoefficientCodec, Rect, ShiftInfo, T1Encoder, TileComponent, WaveletKind, fdwt_53_2d, fdwt_97_2d,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn coding_params(num_resolutions: u32, wavelet: WaveletKind) -> CodingParams {
  CodingParams {
    num_resolutions,
    cblk_expn: Point::new(6, 6),
    prec_expn: Point::new(15, 15),
    wavelet,
    cblk_sty: CblkStyle::empty(),
  }
}

fn band_offsets(orientation: BandOrientation) -> (u32, u32) {
  match orientation {
    BandOrientation::LL => (0, 0),
    BandOrientation::HL => (1, 0),
    BandOrientation::LH => (0, 1),
    BandOrientation::HH => (1, 1),
  }
}

/// Pulls one sub-band's samples out of a resolution's just-transformed
/// interleaved plane, the inverse of `codec.rs`'s synthesis interleave.
fn extract_band(current: &[i32], w: usize, band: &BandWindow) -> Vec<i32> {
  let band_rect = band.bounds();
  if band_rect.is_empty() {
    return Vec::new();
  }
  let (xob, yob) = band_offsets(band.orientation);
  let bw = band_rect.width();
  let bh = band_rect.height();
  let mut out = vec![0i32; (bw * bh) as usize];
  for v in 0..bh {
    for u in 0..bw {
      let full_x = 2 * (band_rect.x0 + u) + xob;
      let full_y = 2 * (band_rect.y0 + v) + yob;
      out[(v * bw + u) as usize] = current[full_y as usize * w + full_x as usize];
    }
  }
  out
}

/// Pulls the even/even LL samples out of a just-transformed plane,
/// producing the next (coarser) resolution's full plane.
fn extract_ll(current: &[i32], w: usize, next_rect: Rect) -> Vec<i32> {
  let nw = next_rect.width() as usize;
  let nh = next_rect.height() as usize;
  let mut out = vec![0i32; nw * nh];
  for y in 0..nh {
    for x in 0..nw {
      out[y * nw + x] = current[(y * 2) * w + x * 2];
    }
  }
  out
}

fn emit_codeblocks(resno: u32, band: &BandWindow, band_plane: &[i32], cblk_sty: CblkStyle, out: &mut Vec<CodeBlockPayload>) {
  let band_rect = band.bounds();
  if band_rect.is_empty() {
    return;
  }
  let bw = band_rect.width() as usize;
  for precinct in &band.precincts {
    for cblkno in 0..precinct.num_codeblocks() {
      let rect = precinct.codeblock_bounds(cblkno);
      if rect.is_empty() {
        continue;
      }
      let mut coeffs = Vec::with_capacity(rect.area() as usize);
      for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
          let row = (y - band_rect.y0) as usize;
          let col = (x - band_rect.x0) as usize;
          coeffs.push(band_plane[row * bw + col]);
        }
      }
      let mut codec = RawCoefficientCodec;
      let (data, numbps) = codec.encode(EncodeRequest {
        coefficients: &coeffs,
        rect,
        cblk_sty,
      });
      out.push(CodeBlockPayload {
        resno,
        orientation: band.orientation,
        rect,
        numbps,
        data,
      });
    }
  }
}

/// Forward per-component pipeline: DC-shift, then resolution-by-resolution
/// wavelet analysis fine-to-coarse, splitting every sub-band into
/// code-block payloads, mirroring `Decoder::decode_component` run in
/// reverse.
pub fn encode_component(plane: &[i32], tile_rect: Rect, prec: u32, sgnd: bool, dc_level_shift: i32, coding: &CodingParams) -> ComponentInput {
  let shift = ShiftInfo::new(prec, sgnd, dc_level_shift);
  let tc = TileComponent::new(tile_rect, coding.num_resolutions, coding.cblk_expn, coding.prec_expn, coding.wavelet).unwrap();

  let mut current: Vec<i32> = plane.iter().map(|&v| shift.apply_encode(v)).collect();
  let mut current_rect = tc.resolutions[tc.resolutions.len() - 1].rect;
  let mut cblks = Vec::new();

  for resno in (1..tc.resolutions.len()).rev() {
    let w = current_rect.width() as usize;
    let h = current_rect.height() as usize;
    match coding.wavelet {
      WaveletKind::Reversible53 => fdwt_53_2d(&mut current, w, h),
      WaveletKind::Irreversible97 => {
        let mut f: Vec<f32> = current.iter().map(|&v| v as f32).collect();
        fdwt_97_2d(&mut f, w, h);
        current = f.iter().map(|&v| v.round() as i32).collect();
      }
    }
    for band in tc.resolutions[resno].bands.iter() {
      let band_plane = extract_band(&current, w, band);
      emit_codeblocks(resno as u32, band, &band_plane, coding.cblk_sty, &mut cblks);
    }
    let next_rect = tc.resolutions[resno - 1].rect;
    current = extract_ll(&current, w, next_rect);
    current_rect = next_rect;
  }

  let band0 = &tc.resolutions[0].bands[0];
  emit_codeblocks(0, band0, &current, coding.cblk_sty, &mut cblks);

  ComponentInput {
    tile_rect,
    prec,
    sgnd,
    dc_level_shift,
    cblks,
  }
}

/// Wraps a seeded `StdRng` so every test fixture draws from a fixed,
/// reproducible stream instead of the process entropy source.
pub struct Lcg(StdRng);

impl Lcg {
  pub fn new(seed: u64) -> Self {
    Self(StdRng::seed_from_u64(seed))
  }

  pub fn next_range(&mut self, lo: i32, hi: i32) -> i32 {
    self.0.gen_range(lo..=hi)
  }
}
