/*
 * The copyright in this software is being made available under the 2-clauses
 * BSD License, included below. This software may be subject to other third
 * party and contributor rights, including patent rights, and no such rights
 * are granted under this license.
 *
 * Copyright (c) 2017, IntoPix SA <contact@intopix.com>
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

//! `SparseBuffer` (spec §4.3 / C3): a hash-mapped grid of fixed-size
//! sub-tiles, materialized lazily and used only for region-restricted
//! decode. Directly adapted from the teacher's `sparse_array.rs`
//! (`SparseArray`), which already stores `blocks: Vec<Option<Vec<i32>>>`
//! safely; this version replaces its raw-pointer `read`/`write` (needed
//! there to share code with the C-ABI surface) with plain slice copies,
//! and exposes `alloc(rect)` directly instead of only write-triggered
//! materialization, per spec §4.3's documented contract.

use crate::error::CoreError;
use crate::geometry::Rect;
use crate::math::uint_ceildiv;

#[derive(Clone)]
pub struct SparseBuffer {
  width: u32,
  height: u32,
  block_width: u32,
  block_height: u32,
  block_count_hor: u32,
  block_count_ver: u32,
  blocks: Vec<Option<Vec<i32>>>,
}

impl SparseBuffer {
  pub fn new(width: u32, height: u32, block_width: u32, block_height: u32) -> Option<Self> {
    if width == 0 || height == 0 || block_width == 0 || block_height == 0 {
      return None;
    }
    let block_count_hor = uint_ceildiv(width, block_width);
    let block_count_ver = uint_ceildiv(height, block_height);
    if block_count_hor > u32::MAX / block_count_ver.max(1) {
      return None;
    }
    let total = (block_count_hor as u64 * block_count_ver as u64) as usize;
    Some(Self {
      width,
      height,
      block_width,
      block_height,
      block_count_hor,
      block_count_ver,
      blocks: vec![None; total],
    })
  }

  fn block_index(&self, bx: u32, by: u32) -> usize {
    (by * self.block_count_hor + bx) as usize
  }

  fn is_region_valid(&self, r: Rect) -> bool {
    !(r.x0 >= self.width || r.x1 <= r.x0 || r.x1 > self.width
      || r.y0 >= self.height || r.y1 <= r.y0 || r.y1 > self.height)
  }

  /// Ensures every sub-tile overlapping `rect` is materialized (zero-filled
  /// if newly created). Spec §4.3: "Failure to allocate is signaled as a
  /// sparse-buffer allocation error."
  pub fn alloc(&mut self, rect: Rect) -> Result<(), CoreError> {
    if !self.is_region_valid(rect) {
      return Err(CoreError::SparseBufferAlloc {
        x0: rect.x0,
        y0: rect.y0,
        x1: rect.x1,
        y1: rect.y1,
      });
    }
    let bx0 = rect.x0 / self.block_width;
    let bx1 = uint_ceildiv(rect.x1, self.block_width);
    let by0 = rect.y0 / self.block_height;
    let by1 = uint_ceildiv(rect.y1, self.block_height);
    for by in by0..by1 {
      for bx in bx0..bx1 {
        let idx = self.block_index(bx, by);
        if self.blocks[idx].is_none() {
          self.blocks[idx] = Some(vec![0i32; (self.block_width * self.block_height) as usize]);
        }
      }
    }
    Ok(())
  }

  /// Copies `rect` out of the sparse buffer into `dest` (row-major, stride
  /// `dest_stride` samples). Missing (never-written) sub-tiles read back
  /// as zero. `forgiving` controls whether an out-of-range `rect` is a
  /// silent no-op (`true`, matches `sparse_array_read`'s `forgiving` flag)
  /// or an error.
  pub fn read(&self, rect: Rect, dest: &mut [i32], dest_stride: usize, forgiving: bool) -> Result<(), CoreError> {
    if !self.is_region_valid(rect) {
      return if forgiving {
        Ok(())
      } else {
        Err(CoreError::SparseBufferAlloc {
          x0: rect.x0,
          y0: rect.y0,
          x1: rect.x1,
          y1: rect.y1,
        })
      };
    }
    for y in rect.y0..rect.y1 {
      let by = y / self.block_height;
      let row_in_block = (y % self.block_height) as usize;
      let dest_row = &mut dest[((y - rect.y0) as usize * dest_stride)..][..rect.width() as usize];
      for x in rect.x0..rect.x1 {
        let bx = x / self.block_width;
        let col_in_block = (x % self.block_width) as usize;
        let idx = self.block_index(bx, by);
        let v = match &self.blocks[idx] {
          Some(block) => block[row_in_block * self.block_width as usize + col_in_block],
          None => 0,
        };
        dest_row[(x - rect.x0) as usize] = v;
      }
    }
    Ok(())
  }

  /// Writes `src` (row-major, stride `src_stride`) into `rect`,
  /// materializing sub-tiles as needed.
  pub fn write(&mut self, rect: Rect, src: &[i32], src_stride: usize, forgiving: bool) -> Result<(), CoreError> {
    if !self.is_region_valid(rect) {
      return if forgiving {
        Ok(())
      } else {
        Err(CoreError::SparseBufferAlloc {
          x0: rect.x0,
          y0: rect.y0,
          x1: rect.x1,
          y1: rect.y1,
        })
      };
    }
    self.alloc(rect)?;
    for y in rect.y0..rect.y1 {
      let by = y / self.block_height;
      let row_in_block = (y % self.block_height) as usize;
      let src_row = &src[((y - rect.y0) as usize * src_stride)..][..rect.width() as usize];
      for x in rect.x0..rect.x1 {
        let bx = x / self.block_width;
        let col_in_block = (x % self.block_width) as usize;
        let idx = self.block_index(bx, by);
        let block = self.blocks[idx].as_mut().expect("alloc materialized this block");
        block[row_in_block * self.block_width as usize + col_in_block] = src_row[(x - rect.x0) as usize];
      }
    }
    Ok(())
  }
}
