//! Precincts, code blocks, and band windows (spec §3, §4.1-§4.2 / C1).
//!
//! Grounded on `original_source/.../t1/Precinct.h`'s `PrecinctImpl`
//! (code-block grid derivation, lazy `ChunkedArray` + tag-tree
//! construction) and the teacher's `tcd.rs` (`opj_tcd_band_t`/
//! `opj_tcd_precinct_t`/`opj_tcd_cblk_dec_t`/`opj_tcd_cblk_enc_t`, whose
//! field names — `numbps`, `cblkw`/`cblkh` derived grids, `stepsize` — are
//! kept here, in safe form).

use crate::chunked_array::ChunkedArray;
use crate::geometry::{Point, Rect};
use crate::tagtree::TagTree;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BandOrientation {
  LL,
  HL,
  LH,
  HH,
}

impl BandOrientation {
  /// Gain exponent `gain_b[orientation]` used for `R_b` (block dynamic
  /// range), per `original_source/.../DecompressScheduler.cpp`'s
  /// `gain_b` table.
  pub fn gain(&self) -> u8 {
    match self {
      BandOrientation::LL => 0,
      BandOrientation::HL | BandOrientation::LH => 1,
      BandOrientation::HH => 2,
    }
  }
}

/// Compressed-payload + decoded-coefficient-plane code block (spec §3's
/// `Codeblock`). The compress/decompress "variants" named in the spec are
/// expressed as the `encoded`/`decoded` halves of one struct rather than
/// two separate types, since both share rectangle/`numbps` bookkeeping and
/// only one half is ever populated for a given codec direction.
pub struct Codeblock {
  pub rect: Rect,
  /// significant bit planes
  pub numbps: u8,
  /// variable-length compressed-data buffer (encoder output / decoder input)
  pub data: Vec<u8>,
  /// decoded coefficient plane, allocated on first decode; `rect.width()
  /// * rect.height()` entries, row-major.
  pub coefficients: Option<Vec<i32>>,
}

impl Codeblock {
  fn new_at(rect: Rect) -> Self {
    Self {
      rect,
      numbps: 0,
      data: Vec::new(),
      coefficients: None,
    }
  }

  pub fn ensure_coefficients(&mut self) -> &mut Vec<i32> {
    let area = self.rect.area() as usize;
    self.coefficients.get_or_insert_with(|| vec![0i32; area])
  }
}

/// Rectangular grouping of code blocks within a band (spec §3's `Precinct`).
pub struct Precinct {
  pub bounds: Rect,
  cblk_expn: Point,
  cblk_grid: Rect,
  codeblocks: ChunkedArray<Codeblock>,
  incl_tree: Option<TagTree>,
  imsb_tree: Option<TagTree>,
}

impl Precinct {
  /// `bounds` is the precinct rectangle already intersected with the band
  /// (spec §4.2 "Precinct initialization"); `cblk_expn` is the effective
  /// (possibly clamped) code-block size exponent pair.
  pub fn new(bounds: Rect, cblk_expn: Point) -> Self {
    let cblk_grid = Rect::new(
      bounds.x0 >> cblk_expn.x,
      bounds.y0 >> cblk_expn.y,
      bounds.x1.div_ceil(1 << cblk_expn.x),
      bounds.y1.div_ceil(1 << cblk_expn.y),
    );
    let num_cblks = cblk_grid.area();
    let mut incl_tree = None;
    let mut imsb_tree = None;
    if cblk_grid.width() > 0 && cblk_grid.height() > 0 {
      // Spec §4.1: tag trees degrade gracefully if allocation fails; in
      // safe Rust that only happens on OOM, which we don't simulate, but
      // the `Option` keeps the same "tree may be absent" shape.
      incl_tree = TagTree::new(cblk_grid.width(), cblk_grid.height());
      imsb_tree = TagTree::new(cblk_grid.width(), cblk_grid.height());
    }
    Self {
      bounds,
      cblk_expn,
      cblk_grid,
      codeblocks: ChunkedArray::new(num_cblks),
      incl_tree,
      imsb_tree,
    }
  }

  pub fn cblk_grid(&self) -> Rect {
    self.cblk_grid
  }

  pub fn num_codeblocks(&self) -> u64 {
    self.cblk_grid.area()
  }

  /// `getCodeBlockBounds`: `C = C_nominal ∩ bounds` where `C_nominal` is
  /// the `1<<expn` square at the block's grid position (spec §4.1
  /// invariant).
  pub fn codeblock_bounds(&self, cblkno: u64) -> Rect {
    let gw = self.cblk_grid.width().max(1) as u64;
    let gx = self.cblk_grid.x0 + (cblkno % gw) as u32;
    let gy = self.cblk_grid.y0 + (cblkno / gw) as u32;
    let x0 = gx << self.cblk_expn.x;
    let y0 = gy << self.cblk_expn.y;
    let nominal = Rect::new(x0, y0, x0 + (1 << self.cblk_expn.x), y0 + (1 << self.cblk_expn.y));
    nominal.intersection(&self.bounds)
  }

  /// Returns the (lazily materialized) code block at `cblkno`.
  pub fn codeblock(&mut self, cblkno: u64) -> &mut Codeblock {
    let bounds = self.codeblock_bounds(cblkno);
    self
      .codeblocks
      .get_or_init(cblkno, move |_| Codeblock::new_at(bounds))
  }

  pub fn codeblock_if_present(&self, cblkno: u64) -> Option<&Codeblock> {
    self.codeblocks.get(cblkno)
  }

  pub fn incl_tree_mut(&mut self) -> Option<&mut TagTree> {
    self.incl_tree.as_mut()
  }

  pub fn imsb_tree_mut(&mut self) -> Option<&mut TagTree> {
    self.imsb_tree.as_mut()
  }
}

/// One of LL/HL/LH/HH at a resolution (spec §3's `BandWindow`).
pub struct BandWindow {
  pub orientation: BandOrientation,
  pub numbps: u8,
  pub stepsize: f32,
  pub precincts: Vec<Precinct>,
}

impl BandWindow {
  pub fn bounds(&self) -> Rect {
    // A band's own extent is the union of its precinct bounds; callers
    // that need the authoritative band rectangle get it from the owning
    // `Resolution` (computed once from the tile-component rect), this is
    // just used by is_empty style checks.
    self
      .precincts
      .iter()
      .fold(Rect::new(u32::MAX, u32::MAX, 0, 0), |acc, p| {
        if p.bounds.is_empty() {
          acc
        } else {
          Rect::new(
            acc.x0.min(p.bounds.x0),
            acc.y0.min(p.bounds.y0),
            acc.x1.max(p.bounds.x1),
            acc.y1.max(p.bounds.y1),
          )
        }
      })
  }

  pub fn is_empty(&self) -> bool {
    self.precincts.iter().all(|p| p.bounds.is_empty())
  }
}
