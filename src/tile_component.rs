//! Tile-component spatial model (spec §2 "Tile-component lattice", §4
//! data model): resolutions, sub-bands, precincts and code blocks,
//! plus region-of-interest window propagation down the resolution
//! pyramid.
//!
//! Grounded on `original_source/.../tile/TileComponent.cpp`: resolution
//! rectangles are `tile_comp_rect.rectceildivpow2(levelno)` (coarsest
//! resolution is `numresolutions - 1` levels down); the precinct grid at
//! each resolution is derived from the resolution rect and that
//! resolution's precinct-size exponent; region windows propagate upward
//! (finer resolution from coarser) via ITU-T.801 eq. B-15, growing the
//! window by a filter-support margin of 2 samples for the reversible 5/3
//! wavelet or 3 samples for the irreversible 9/7 wavelet before halving
//! back up to the next resolution.

use smallvec::{smallvec, SmallVec};

use crate::error::CoreError;
use crate::geometry::{Point, Rect};
use crate::math::uint_ceildivpow2;
use crate::precinct::{BandOrientation, BandWindow, Precinct};
use crate::wavelet::WaveletKind;

/// One dyadic resolution level of a tile-component (spec §2).
pub struct Resolution {
  /// This resolution's extent in tile-component (reference-grid)
  /// coordinates.
  pub rect: Rect,
  /// Exactly 1 band (LL) at resolution 0, exactly 3 (HL/LH/HH) at every
  /// other resolution — never any other count, so this is sized inline
  /// rather than heap-allocated like a general `Vec`.
  pub bands: SmallVec<[BandWindow; 3]>,
}

impl Resolution {
  pub fn is_lowest(&self) -> bool {
    self.bands.len() == 1
  }
}

/// A single component of a single tile (spec §2/§3).
pub struct TileComponent {
  pub rect: Rect,
  pub num_resolutions: u32,
  pub resolutions: Vec<Resolution>,
  pub cblk_expn: Point,
  pub wavelet: WaveletKind,
}

/// Filter support margin added on each side of a propagated region
/// window, per ITU-T.801 eq. B-15: 2 samples for the 5/3 reversible
/// filter, 3 for the 9/7 irreversible filter.
fn filter_margin(wavelet: WaveletKind) -> u32 {
  match wavelet {
    WaveletKind::Reversible53 => 2,
    WaveletKind::Irreversible97 => 3,
  }
}

impl TileComponent {
  /// Builds the resolution pyramid for a tile-component occupying `rect`
  /// on the reference grid, with `num_resolutions` dyadic levels and a
  /// nominal precinct-size exponent pair `prec_expn` applied uniformly
  /// (real codestreams can vary this per resolution via the COD/COC
  /// marker; that variation is carried by the out-of-scope T2 packet
  /// parser and is outside this constructor's job).
  pub fn new(
    rect: Rect,
    num_resolutions: u32,
    cblk_expn: Point,
    prec_expn: Point,
    wavelet: WaveletKind,
  ) -> Result<Self, CoreError> {
    if num_resolutions == 0 {
      return Err(CoreError::GeometryOverflow {
        what: "tile-component with zero resolutions",
      });
    }
    let mut resolutions = Vec::with_capacity(num_resolutions as usize);
    for resno in 0..num_resolutions {
      let levelno = num_resolutions - 1 - resno;
      let res_rect = rect.ceildivpow2(levelno);
      let bands: SmallVec<[BandWindow; 3]> = if resno == 0 {
        smallvec![make_band(res_rect, BandOrientation::LL, cblk_expn, prec_expn)]
      } else {
        // child-band exponents shrink by one level past the LL-only
        // resolution, per TileComponent.cpp's `cbgwidthexpn = pdx - 1`.
        let child_cblk = Point::new(cblk_expn.x.saturating_sub(1).max(1), cblk_expn.y.saturating_sub(1).max(1));
        smallvec![
          make_band(half_band_rect(res_rect, true, false), BandOrientation::HL, child_cblk, prec_expn),
          make_band(half_band_rect(res_rect, false, true), BandOrientation::LH, child_cblk, prec_expn),
          make_band(half_band_rect(res_rect, true, true), BandOrientation::HH, child_cblk, prec_expn),
        ]
      };
      resolutions.push(Resolution { rect: res_rect, bands });
    }
    Ok(Self {
      rect,
      num_resolutions,
      resolutions,
      cblk_expn,
      wavelet,
    })
  }

  /// Propagates a region-of-interest window (spec §2's "window decode")
  /// from the target resolution down to every coarser resolution,
  /// returning one padded rect per resolution in `0..=target_resno`.
  /// Mirrors `TileComponent.cpp`'s per-resolution `window->grow(margin,
  /// margin)` then halving back toward resolution 0.
  pub fn propagate_window(&self, window: Rect, target_resno: u32) -> Vec<Rect> {
    let margin = filter_margin(self.wavelet);
    let mut windows = vec![Rect::default(); target_resno as usize + 1];
    let mut current = window.intersection(&self.resolutions[target_resno as usize].rect);
    windows[target_resno as usize] = current;
    for resno in (0..target_resno).rev() {
      let grown = current.grow(margin, margin);
      let half = Rect::new(grown.x0 / 2, grown.y0 / 2, grown.x1.div_ceil(2), grown.y1.div_ceil(2));
      current = half.intersection(&self.resolutions[resno as usize].rect);
      windows[resno as usize] = current;
    }
    windows
  }
}

fn make_band(rect: Rect, orientation: BandOrientation, cblk_expn: Point, prec_expn: Point) -> BandWindow {
  let precincts = if rect.is_empty() {
    Vec::new()
  } else {
    let pw = 1u32 << prec_expn.x;
    let ph = 1u32 << prec_expn.y;
    let px0 = (rect.x0 / pw) * pw;
    let py0 = (rect.y0 / ph) * ph;
    let mut precincts = Vec::new();
    let mut y = py0;
    while y < rect.y1 {
      let mut x = px0;
      while x < rect.x1 {
        let p_rect = Rect::new(x, y, x + pw, y + ph).intersection(&rect);
        if !p_rect.is_empty() {
          precincts.push(Precinct::new(p_rect, cblk_expn));
        }
        x += pw;
      }
      y += ph;
    }
    precincts
  };
  BandWindow {
    orientation,
    numbps: 0,
    stepsize: 1.0,
    precincts,
  }
}

/// Maps one axis of a tile-band rectangle to its sub-band coordinate,
/// per ITU-T.801 eq. B-15 (`TileComponent.cpp`'s `window->x0`/`x1`
/// derivation) for a single decomposition level: `offset` is the band's
/// parity (0 for low, 1 for high) and must be subtracted *before*
/// halving, not after, so an odd extent doesn't over-count the high
/// half by one column/row.
fn band_axis(v0: u32, v1: u32, offset: u32) -> (u32, u32) {
  let lo = if v0 <= offset { 0 } else { uint_ceildivpow2(v0 - offset, 1) };
  let hi = if v1 <= offset { 0 } else { uint_ceildivpow2(v1 - offset, 1) };
  (lo, hi)
}

/// Halves `rect` into one of the three detail-band sub-rects: `horiz`
/// selects the odd-column half, `vert` the odd-row half (so
/// `(horiz=true, vert=false)` is HL, `(false, true)` is LH, `(true,
/// true)` is HH), following the same odd/even split the wavelet lifting
/// itself uses.
fn half_band_rect(rect: Rect, horiz: bool, vert: bool) -> Rect {
  let (x0, x1) = band_axis(rect.x0, rect.x1, if horiz { 1 } else { 0 });
  let (y0, y1) = band_axis(rect.y0, rect.y1, if vert { 1 } else { 0 });
  Rect::new(x0, y0, x1.max(x0), y1.max(y0))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolution_pyramid_has_one_band_at_dc_and_three_elsewhere() {
    let tc = TileComponent::new(
      Rect::new(0, 0, 256, 256),
      4,
      Point::new(6, 6),
      Point::new(15, 15),
      WaveletKind::Reversible53,
    )
    .unwrap();
    assert_eq!(tc.resolutions.len(), 4);
    assert_eq!(tc.resolutions[0].bands.len(), 1);
    for r in &tc.resolutions[1..] {
      assert_eq!(r.bands.len(), 3);
    }
  }

  #[test]
  fn coarsest_resolution_is_smallest() {
    let tc = TileComponent::new(
      Rect::new(0, 0, 256, 256),
      4,
      Point::new(6, 6),
      Point::new(15, 15),
      WaveletKind::Reversible53,
    )
    .unwrap();
    assert!(tc.resolutions[0].rect.width() < tc.resolutions[3].rect.width());
    assert_eq!(tc.resolutions[3].rect, Rect::new(0, 0, 256, 256));
  }

  #[test]
  fn odd_resolution_extent_splits_low_and_high_bands_without_overlap_or_escape() {
    // 12x12 at 4 resolutions puts an odd 3x3 extent at resno 1
    // (ceildivpow2(12, 2) == 3), the case eq. B-15's offset-before-halve
    // split must get right: low axis width 2, high axis width 1, not 2/2.
    let tc = TileComponent::new(Rect::new(0, 0, 12, 12), 4, Point::new(6, 6), Point::new(15, 15), WaveletKind::Reversible53).unwrap();
    assert_eq!(tc.resolutions[1].rect, Rect::new(0, 0, 3, 3));
    assert_eq!(tc.resolutions[0].rect.width(), 2);
    for band in tc.resolutions[1].bands.iter() {
      let b = band.bounds();
      assert!(b.x1 <= 3 && b.y1 <= 3, "band escapes its resolution's 3x3 extent: {b:?}");
    }
    let hl = tc.resolutions[1].bands.iter().find(|b| b.orientation == BandOrientation::HL).unwrap();
    assert_eq!(hl.bounds().width(), 1);
    assert_eq!(hl.bounds().height(), 2);
  }

  #[test]
  fn window_propagation_grows_toward_coarser_resolutions() {
    let tc = TileComponent::new(
      Rect::new(0, 0, 64, 64),
      3,
      Point::new(6, 6),
      Point::new(15, 15),
      WaveletKind::Irreversible97,
    )
    .unwrap();
    let windows = tc.propagate_window(Rect::new(20, 20, 30, 30), 2);
    assert_eq!(windows.len(), 3);
    // every ancestor window must contain the scaled-down target window
    assert!(windows[2].width() >= 10);
    assert!(windows[0].width() > 0);
  }

  #[test]
  fn zero_resolutions_is_rejected() {
    assert!(TileComponent::new(Rect::new(0, 0, 16, 16), 0, Point::new(6, 6), Point::new(15, 15), WaveletKind::Reversible53).is_err());
  }
}
