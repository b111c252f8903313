//! Per-component task-dependency graph (spec §5 "Dependency graph").
//!
//! Grounded on `original_source/.../scheduling/ImageComponentFlow.cpp`:
//! each tile-component owns a chain of `ResFlow` nodes, one per
//! resolution except that the two lowest resolutions are combined into a
//! single node (`numResFlows_ = numResolutions - 1` when there is more
//! than one resolution), and consecutive `ResFlow`s `precede()` each
//! other so resolution `r` only starts once resolution `r-1`'s wavelet
//! step has produced its LL input.
//!
//! Rather than model a generic task-graph library (the C++ original uses
//! `tf::Taskflow`), this module only records the edges the scheduler
//! needs: ordered groups of code-block-decode "blocks", each tagged with
//! whether a wavelet step runs after it completes. `scheduler.rs` walks
//! this structure and hands each group to a `rayon` scope/join, honoring
//! the edges by joining before moving to the next group.

/// One node in a tile-component's resolution chain.
pub struct ResFlow<B> {
  /// code-block decode/encode tasks belonging to this node's resolution
  /// group (one or two resolutions combined, see module docs).
  pub blocks: Vec<B>,
  pub wavelet_horiz: bool,
  pub wavelet_vert: bool,
  pub do_wavelet: bool,
}

impl<B> ResFlow<B> {
  fn new() -> Self {
    Self {
      blocks: Vec::new(),
      wavelet_horiz: true,
      wavelet_vert: true,
      do_wavelet: true,
    }
  }
}

/// The resolution chain for a single tile-component (spec §5's
/// dependency graph restricted to one component; MCT/inter-component
/// edges are handled one level up by the scheduler once every
/// component's `ImageComponentFlow` has finished).
pub struct ImageComponentFlow<B> {
  pub res_flows: Vec<ResFlow<B>>,
  pub no_wavelet: bool,
}

impl<B> ImageComponentFlow<B> {
  /// `num_resolutions` is the tile-component's resolution count (spec
  /// §3's `numresolutions`). Mirrors the constructor's `noWavelet =
  /// (numResFlows_ == 1); if (numResFlows_ > 1) numResFlows_--;` logic:
  /// a single-resolution tile-component has no wavelet synthesis step at
  /// all, and every other case groups its two lowest resolutions into
  /// one node.
  pub fn new(num_resolutions: u32) -> Self {
    let mut num_res_flows = num_resolutions.max(1);
    let no_wavelet = num_res_flows == 1;
    if num_res_flows > 1 {
      num_res_flows -= 1;
    }
    let res_flows = (0..num_res_flows).map(|_| ResFlow::new()).collect();
    Self { res_flows, no_wavelet }
  }

  /// Appends a code-block decode task to the group for `resno`, grouping
  /// `resno == 0` and `resno == 1` into the same node (index 0) the way
  /// `DecompressScheduler::prepareSchedule`'s "combine first two
  /// resolutions" pass does.
  pub fn push_block(&mut self, resno: u32, block: B) {
    let idx = if resno == 0 { 0 } else { (resno - 1) as usize };
    if let Some(flow) = self.res_flows.get_mut(idx) {
      flow.blocks.push(block);
    }
  }

  /// Number of `precede()` edges in this component's chain (for tests /
  /// diagnostics only; the scheduler itself just iterates in order).
  pub fn num_edges(&self) -> usize {
    self.res_flows.len().saturating_sub(1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_resolution_has_no_wavelet_step() {
    let flow: ImageComponentFlow<u32> = ImageComponentFlow::new(1);
    assert!(flow.no_wavelet);
    assert_eq!(flow.res_flows.len(), 1);
    assert_eq!(flow.num_edges(), 0);
  }

  #[test]
  fn multi_resolution_combines_two_lowest() {
    let mut flow: ImageComponentFlow<u32> = ImageComponentFlow::new(4);
    assert!(!flow.no_wavelet);
    assert_eq!(flow.res_flows.len(), 3);
    flow.push_block(0, 100);
    flow.push_block(1, 101);
    flow.push_block(2, 102);
    flow.push_block(3, 103);
    assert_eq!(flow.res_flows[0].blocks, vec![100, 101]);
    assert_eq!(flow.res_flows[1].blocks, vec![102]);
    assert_eq!(flow.res_flows[2].blocks, vec![103]);
  }
}
