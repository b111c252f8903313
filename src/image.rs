/*
 * The copyright in this software is being made available under the 2-clauses
 * BSD License, included below. This software may be subject to other third
 * party and contributor rights, including patent rights, and no such rights
 * are granted under this license.
 *
 * Copyright (c) 2005, Herve Drolon, FreeImage Team
 * All rights reserved.
 *
 * Redistribution and use in source and binary forms, with or without
 * modification, are permitted provided that the following conditions
 * are met:
 * 1. Redistributions of source code must retain the above copyright
 *    notice, this list of conditions and the following disclaimer.
 * 2. Redistributions in binary form must reproduce the above copyright
 *    notice, this list of conditions and the following disclaimer in the
 *    documentation and/or other materials provided with the distribution.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS `AS IS'
 * AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
 * ARE DISCLAIMED.
 */

//! Output image model (spec §3's `Image`/`Component`). Grounded on the
//! teacher's `opj_image`/`opj_image_comp` (same field set: `dx`/`dy`
//! subsampling, `prec`/`sgnd`, per-component `x0`/`y0`/`w`/`h`), but with
//! `data: *mut OPJ_INT32` replaced by a plain `Vec<i32>` since this crate
//! has no C ABI to share storage with; `clip`/`scale`/`scale_up` are kept
//! verbatim (they're already safe arithmetic in the teacher).

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorSpace {
  #[default]
  Unknown,
  Srgb,
  Gray,
  Sycc,
  Eycc,
  Cmyk,
}

/// One image component (spec §3). `dx`/`dy` are the sub-sampling factors
/// relative to the reference grid, mirroring `opj_image_comp`.
#[derive(Clone, Debug, Default)]
pub struct Component {
  pub dx: u32,
  pub dy: u32,
  pub w: u32,
  pub h: u32,
  pub x0: u32,
  pub y0: u32,
  pub prec: u32,
  pub sgnd: bool,
  /// number of resolutions actually decoded (spec §4.2's `reduce`).
  pub resno_decoded: u32,
  data: Vec<i32>,
}

impl Component {
  pub fn new(dx: u32, dy: u32, w: u32, h: u32, prec: u32, sgnd: bool) -> Self {
    Self {
      dx,
      dy,
      w,
      h,
      x0: 0,
      y0: 0,
      prec,
      sgnd,
      resno_decoded: 0,
      data: vec![0i32; (w as usize) * (h as usize)],
    }
  }

  pub fn set_dims(&mut self, w: u32, h: u32) {
    if self.w == w && self.h == h {
      return;
    }
    self.w = w;
    self.h = h;
    self.data = vec![0i32; (w as usize) * (h as usize)];
  }

  pub fn data(&self) -> &[i32] {
    &self.data
  }

  pub fn data_mut(&mut self) -> &mut [i32] {
    &mut self.data
  }

  pub fn set_data(&mut self, data: &[i32]) {
    self.set_dims(self.w, self.h);
    self.data.copy_from_slice(data);
  }

  /// Clip component data to the representable range for `precision`.
  pub fn clip(&mut self, precision: u32) {
    let (min, max) = signed_range(precision, self.sgnd);
    for v in self.data.iter_mut() {
      *v = (*v as i64).clamp(min, max) as i32;
    }
    self.prec = precision;
  }

  /// Rescale component samples from `self.prec` bits to `precision` bits.
  pub fn scale(&mut self, precision: u32) {
    if self.prec == precision {
      return;
    }
    if self.prec < precision {
      self.scale_up(precision);
      return;
    }
    let shift = self.prec - precision;
    if self.sgnd {
      for v in self.data.iter_mut() {
        *v >>= shift;
      }
    } else {
      for v in self.data.iter_mut() {
        *v = ((*v as u32) >> shift) as i32;
      }
    }
    self.prec = precision;
  }

  fn scale_up(&mut self, precision: u32) {
    let old_prec = self.prec;
    if self.sgnd {
      let new_max = 1i64 << (precision - 1);
      let old_max = 1i64 << (old_prec - 1);
      for v in self.data.iter_mut() {
        *v = ((*v as i64 * new_max) / old_max) as i32;
      }
    } else {
      let new_max = (1u64 << precision) - 1;
      let old_max = (1u64 << old_prec) - 1;
      for v in self.data.iter_mut() {
        *v = ((*v as u64 * new_max) / old_max) as i32;
      }
    }
    self.prec = precision;
  }
}

fn signed_range(precision: u32, signed: bool) -> (i64, i64) {
  match (precision, signed) {
    (0..=31, false) => (0, (1i64 << precision) - 1),
    (0..=31, true) => {
      let max = (1i64 << (precision - 1)) - 1;
      (-max - 1, max)
    }
    _ => (0, i64::MAX),
  }
}

/// The composited output image (spec §3's `Image`, §6's
/// `getCompositedImage` return value).
#[derive(Clone, Debug, Default)]
pub struct Image {
  pub x0: u32,
  pub y0: u32,
  pub x1: u32,
  pub y1: u32,
  pub color_space: ColorSpace,
  pub comps: Vec<Component>,
}

impl Image {
  pub fn new(color_space: ColorSpace, comps: Vec<Component>) -> Self {
    Self {
      x0: 0,
      y0: 0,
      x1: 0,
      y1: 0,
      color_space,
      comps,
    }
  }

  /// True when every component shares dimensions and subsampling (spec
  /// §4.3's precondition for a "composited" single-plane view).
  pub fn comps_same_dims(&self) -> bool {
    match self.comps.split_first() {
      Some((c0, rest)) => rest
        .iter()
        .all(|c| c.w == c0.w && c.h == c0.h && c.dx == c0.dx && c.dy == c0.dy),
      None => false,
    }
  }

  pub fn comps_match(&self) -> bool {
    match self.comps.split_first() {
      Some((c0, rest)) => rest.iter().all(|c| {
        c.w == c0.w && c.h == c0.h && c.dx == c0.dx && c.dy == c0.dy && c.prec == c0.prec && c.sgnd == c0.sgnd
      }),
      None => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scale_down_then_up_preserves_top_bits() {
    let mut c = Component::new(1, 1, 2, 1, 12, false);
    c.set_data(&[4095, 0]);
    c.scale(8);
    assert_eq!(c.data(), &[255, 0]);
  }

  #[test]
  fn clip_clamps_signed_range() {
    let mut c = Component::new(1, 1, 2, 1, 8, true);
    c.set_data(&[500, -500]);
    c.clip(8);
    assert_eq!(c.data(), &[127, -128]);
  }

  #[test]
  fn comps_same_dims_false_when_empty() {
    let img = Image::new(ColorSpace::Srgb, vec![]);
    assert!(!img.comps_same_dims());
  }
}
