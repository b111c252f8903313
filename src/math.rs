/*
 * The copyright in this software is being made available under the 2-clauses
 * BSD License, included below. This software may be subject to other third
 * party and contributor rights, including patent rights, and no such rights
 * are granted under this license.
 *
 * Copyright (c) 2002-2014, Universite catholique de Louvain (UCL), Belgium
 * Copyright (c) 2002-2014, Professor Benoit Macq
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

//! Small integer-geometry helpers shared by the tile-component lattice.
//!
//! These mirror `opj_uint_ceildiv`/`opj_uint_floordivpow2`/etc. from the
//! teacher crate's (absent from this pack) `math.rs`, whose call shape is
//! visible throughout `sparse_array.rs` and the grok `TileComponent.cpp`
//! this spec was distilled from.

use crate::error::CoreError;

#[inline]
pub fn uint_ceildiv(a: u32, b: u32) -> u32 {
  debug_assert!(b != 0);
  (a as u64).div_ceil(b as u64) as u32
}

#[inline]
pub fn uint_ceildiv64(a: u64, b: u64) -> u64 {
  debug_assert!(b != 0);
  a.div_ceil(b)
}

#[inline]
pub fn uint_floordivpow2(a: u32, b: u32) -> u32 {
  a >> b
}

#[inline]
pub fn uint_ceildivpow2(a: u32, b: u32) -> u32 {
  ((a as u64 + ((1u64 << b) - 1)) >> b) as u32
}

/// `ceildivpow2`, but checked: returns `GeometryOverflow` if the result
/// would not fit back into 32 bits once shifted left again by `b`.
pub fn ceildivpow2_checked(a: u32, b: u32) -> Result<u32, CoreError> {
  let v = (a as u64 + ((1u64 << b) - 1)) >> b;
  let shifted_back = v << b;
  if shifted_back > u32::MAX as u64 {
    return Err(CoreError::GeometryOverflow {
      what: "ceildivpow2 result",
    });
  }
  Ok(v as u32)
}

#[inline]
pub fn int_floorlog2(mut a: u32) -> u32 {
  let mut l = 0;
  while a > 1 {
    a >>= 1;
    l += 1;
  }
  l
}
