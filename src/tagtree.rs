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

//! Tag-tree coder (spec §4.1). A quadtree-of-integers used to signal
//! per-code-block inclusion and the insignificant-MSB count.
//!
//! Grounded on the teacher's `tgt.rs` (`opj_tgt_create`/`opj_tgt_setvalue`/
//! `opj_tgt_encode`/`opj_tgt_decode`), reworked from raw-pointer node chains
//! (`*mut opj_tgt_node_t` with a `parent` pointer) into an index-based
//! arena: `nodes: Vec<Node>` with `parent: Option<usize>`, which is the
//! natural safe-Rust translation of the same quadtree-of-nodes layout and
//! needs no `unsafe`.

/// A bit source/sink for tag-tree coding. `Precinct`/`Codeblock` decode and
/// encode live outside this crate's scope (T1/T2 are external collaborators
/// per spec §1); this trait is the narrow surface the tag tree needs from
/// whatever bit-level codestream reader/writer the caller supplies.
pub trait BitIo {
  fn get_bit(&mut self) -> bool;
  fn put_bit(&mut self, bit: bool);
}

#[derive(Clone, Copy, Debug)]
struct Node {
  parent: Option<usize>,
  value: i32,
  low: i32,
  known: bool,
}

impl Node {
  const fn leaf() -> Self {
    Self {
      parent: None,
      value: 999,
      low: 0,
      known: false,
    }
  }
}

/// Two-dimensional quadtree-of-integers, one per precinct per tree kind
/// (inclusion, insignificant-MSB). See spec §4.1.
#[derive(Clone, Debug)]
pub struct TagTree {
  numleafsh: u32,
  numleafsv: u32,
  nodes: Vec<Node>,
  /// offset of each level's first node into `nodes`, leaves first
  level_offsets: Vec<usize>,
  level_dims: Vec<(u32, u32)>,
}

impl TagTree {
  /// Builds a tree over a `numleafsh x numleafsv` leaf grid. Mirrors
  /// `opj_tgt_create`'s level-size doubling-down loop.
  pub fn new(numleafsh: u32, numleafsv: u32) -> Option<Self> {
    if numleafsh == 0 || numleafsv == 0 {
      return None;
    }
    let mut level_dims = vec![(numleafsh, numleafsv)];
    loop {
      let &(w, h) = level_dims.last().unwrap();
      if w * h <= 1 {
        break;
      }
      level_dims.push(((w + 1) / 2, (h + 1) / 2));
    }

    let mut level_offsets = Vec::with_capacity(level_dims.len());
    let mut total = 0usize;
    for &(w, h) in &level_dims {
      level_offsets.push(total);
      total += (w * h) as usize;
    }

    let mut tree = Self {
      numleafsh,
      numleafsv,
      nodes: vec![Node::leaf(); total],
      level_offsets,
      level_dims,
    };
    tree.link_parents();
    Some(tree)
  }

  fn link_parents(&mut self) {
    for lvl in 0..self.level_dims.len() - 1 {
      let (w, h) = self.level_dims[lvl];
      let parent_w = self.level_dims[lvl + 1].0;
      let base = self.level_offsets[lvl];
      let parent_base = self.level_offsets[lvl + 1];
      for j in 0..h {
        for i in 0..w {
          let idx = base + (j * w + i) as usize;
          let parent_idx = parent_base + ((j / 2) * parent_w + i / 2) as usize;
          self.nodes[idx].parent = Some(parent_idx);
        }
      }
    }
  }

  /// Re-initializes an existing tree to a new leaf grid, zeroing node
  /// state without reallocating when the grid is unchanged. Mirrors
  /// `opj_tgt_init`'s reuse-vs-rebuild branch.
  pub fn reinit(&mut self, numleafsh: u32, numleafsv: u32) -> bool {
    if self.numleafsh != numleafsh || self.numleafsv != numleafsv {
      match Self::new(numleafsh, numleafsv) {
        Some(fresh) => {
          *self = fresh;
          return true;
        }
        None => return false,
      }
    }
    self.reset();
    true
  }

  pub fn reset(&mut self) {
    for node in &mut self.nodes {
      *node = Node::leaf();
    }
  }

  fn leaf_index(&self, i: u32, j: u32) -> usize {
    (j * self.numleafsh + i) as usize
  }

  /// `opj_tgt_setvalue`: propagate `value` up the ancestor chain while it
  /// lowers the running minimum.
  pub fn set_value(&mut self, i: u32, j: u32, value: i32) {
    let mut idx = self.leaf_index(i, j);
    loop {
      if self.nodes[idx].value <= value {
        break;
      }
      self.nodes[idx].value = value;
      match self.nodes[idx].parent {
        Some(p) => idx = p,
        None => break,
      }
    }
  }

  fn ancestor_chain(&self, leafno: usize) -> Vec<usize> {
    let mut stack = Vec::new();
    let mut node = leafno;
    while let Some(p) = self.nodes[node].parent {
      stack.push(node);
      node = p;
    }
    stack.push(node);
    stack
  }

  /// `opj_tgt_decode`: read bits until the leaf's value is proven `<
  /// threshold` (return true) or `>= threshold` (return false).
  pub fn decode_value(&mut self, io: &mut impl BitIo, i: u32, j: u32, threshold: i32) -> bool {
    let leafno = self.leaf_index(i, j);
    let chain = self.ancestor_chain(leafno);
    let mut low = 0;
    for &idx in chain.iter().rev() {
      if low < self.nodes[idx].low {
        low = self.nodes[idx].low;
      }
      while low < threshold && low < self.nodes[idx].value {
        if io.get_bit() {
          self.nodes[idx].value = low;
        } else {
          low += 1;
        }
      }
      self.nodes[idx].low = low;
    }
    self.nodes[leafno].value < threshold
  }

  /// `opj_tgt_encode`: the encoder-side dual of `decode_value`.
  pub fn encode_value(&mut self, io: &mut impl BitIo, i: u32, j: u32, threshold: i32) {
    let leafno = self.leaf_index(i, j);
    let chain = self.ancestor_chain(leafno);
    let mut low = 0;
    for &idx in chain.iter().rev() {
      if low < self.nodes[idx].low {
        low = self.nodes[idx].low;
      }
      while low < threshold {
        if low >= self.nodes[idx].value {
          if !self.nodes[idx].known {
            io.put_bit(true);
            self.nodes[idx].known = true;
          }
          break;
        }
        io.put_bit(false);
        low += 1;
      }
      self.nodes[idx].low = low;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct VecBits {
    bits: Vec<bool>,
    pos: usize,
  }
  impl BitIo for VecBits {
    fn get_bit(&mut self) -> bool {
      let b = self.bits.get(self.pos).copied().unwrap_or(false);
      self.pos += 1;
      b
    }
    fn put_bit(&mut self, bit: bool) {
      self.bits.push(bit);
    }
  }

  #[test]
  fn single_leaf_tree_has_one_node() {
    let tree = TagTree::new(1, 1).unwrap();
    assert_eq!(tree.nodes.len(), 1);
  }

  #[test]
  fn encode_then_decode_round_trips_for_every_leaf() {
    let w = 5;
    let h = 3;
    let mut values = vec![0i32; (w * h) as usize];
    for (idx, v) in values.iter_mut().enumerate() {
      *v = (idx as i32 * 3) % 11;
    }

    let mut enc = TagTree::new(w, h).unwrap();
    for j in 0..h {
      for i in 0..w {
        enc.set_value(i, j, values[(j * w + i) as usize]);
      }
    }
    let mut io = VecBits {
      bits: Vec::new(),
      pos: 0,
    };
    let threshold = 8;
    for j in 0..h {
      for i in 0..w {
        enc.encode_value(&mut io, i, j, threshold);
      }
    }

    let mut dec = TagTree::new(w, h).unwrap();
    io.pos = 0;
    for j in 0..h {
      for i in 0..w {
        let known_below = dec.decode_value(&mut io, i, j, threshold);
        let expected = values[(j * w + i) as usize] < threshold;
        assert_eq!(known_below, expected, "mismatch at ({i},{j})");
      }
    }
  }

  #[test]
  fn reinit_same_dims_resets_without_changing_shape() {
    let mut tree = TagTree::new(4, 4).unwrap();
    tree.set_value(0, 0, 2);
    let nodes_before = tree.nodes.len();
    assert!(tree.reinit(4, 4));
    assert_eq!(tree.nodes.len(), nodes_before);
    assert_eq!(tree.nodes[tree.leaf_index(0, 0)].value, 999);
  }
}
