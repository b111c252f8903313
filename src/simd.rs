//! Runtime SIMD dispatch for the multi-component transform (spec §4.5
//! "SIMD dispatch"). Grounded on
//! `yonasBSD-hayro/hayro-jpeg2000/src/j2c/simd.rs`: an `f32x8<S: Simd>`
//! wrapper generic over `fearless_simd`'s `Simd` marker when the `simd`
//! feature is enabled, falling back to a plain `[f32; 8]` array
//! implementation that compiles on every target with identical semantics.
//!
//! Callers never name a concrete `S`; they go through `dispatch!`, which
//! picks the best `Level` available on the running CPU the way
//! `fearless_simd::dispatch!` does, and pass that level down into a
//! generic helper function.

pub const LANES: usize = 8;

#[cfg(feature = "simd")]
mod inner {
  use super::LANES;
  use fearless_simd::{SimdBase, SimdFloat};
  pub use fearless_simd::{Level, Simd, dispatch};

  #[derive(Copy, Clone)]
  #[allow(non_camel_case_types)]
  pub struct f32x8<S: Simd> {
    inner: fearless_simd::f32x8<S>,
  }

  impl<S: Simd> f32x8<S> {
    #[inline(always)]
    pub fn from_slice(simd: S, slice: &[f32]) -> Self {
      Self {
        inner: fearless_simd::f32x8::from_slice(simd, slice),
      }
    }

    #[inline(always)]
    pub fn splat(simd: S, value: f32) -> Self {
      Self {
        inner: fearless_simd::f32x8::splat(simd, value),
      }
    }

    #[inline(always)]
    pub fn mul_add(self, scalar: f32, addend: Self) -> Self {
      Self {
        inner: self.inner.madd(scalar, addend.inner),
      }
    }

    #[inline(always)]
    pub fn store(self, slice: &mut [f32]) {
      slice[..LANES].copy_from_slice(&self.inner.val);
    }
  }

  impl<S: Simd> core::ops::Add for f32x8<S> {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
      Self {
        inner: self.inner + rhs.inner,
      }
    }
  }

  impl<S: Simd> core::ops::Mul<f32> for f32x8<S> {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: f32) -> Self {
      Self {
        inner: self.inner * rhs,
      }
    }
  }
}

#[cfg(not(feature = "simd"))]
mod inner {
  use super::LANES;

  pub trait Simd: Copy + Clone {}

  #[derive(Copy, Clone)]
  pub struct ScalarSimd;
  impl Simd for ScalarSimd {}

  pub struct Level;
  impl Level {
    #[inline(always)]
    pub fn new() -> Self {
      Level
    }
  }

  #[derive(Copy, Clone)]
  #[allow(non_camel_case_types)]
  pub struct f32x8<S: Simd> {
    val: [f32; LANES],
    _marker: core::marker::PhantomData<S>,
  }

  impl<S: Simd> f32x8<S> {
    #[inline(always)]
    pub fn from_slice(_simd: S, slice: &[f32]) -> Self {
      let mut val = [0.0f32; LANES];
      val.copy_from_slice(&slice[..LANES]);
      Self {
        val,
        _marker: core::marker::PhantomData,
      }
    }

    #[inline(always)]
    pub fn splat(_simd: S, value: f32) -> Self {
      Self {
        val: [value; LANES],
        _marker: core::marker::PhantomData,
      }
    }

    #[inline(always)]
    pub fn mul_add(self, scalar: f32, addend: Self) -> Self {
      let mut result = [0.0f32; LANES];
      for i in 0..LANES {
        result[i] = self.val[i].mul_add(scalar, addend.val[i]);
      }
      Self {
        val: result,
        _marker: core::marker::PhantomData,
      }
    }

    #[inline(always)]
    pub fn store(self, slice: &mut [f32]) {
      slice[..LANES].copy_from_slice(&self.val);
    }
  }

  impl<S: Simd> core::ops::Add for f32x8<S> {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
      let mut result = [0.0f32; LANES];
      for i in 0..LANES {
        result[i] = self.val[i] + rhs.val[i];
      }
      Self {
        val: result,
        _marker: core::marker::PhantomData,
      }
    }
  }

  impl<S: Simd> core::ops::Mul<f32> for f32x8<S> {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: f32) -> Self {
      let mut result = [0.0f32; LANES];
      for i in 0..LANES {
        result[i] = self.val[i] * rhs;
      }
      Self {
        val: result,
        _marker: core::marker::PhantomData,
      }
    }
  }

  /// Scalar-only dispatch: always selects `ScalarSimd`, no runtime
  /// feature probing.
  #[macro_export]
  macro_rules! simd_dispatch {
    ($level:expr, $simd:ident => $body:expr) => {{
      let _ = $level;
      let $simd = $crate::simd::ScalarSimd;
      $body
    }};
  }

  pub use simd_dispatch as dispatch;
}

pub use inner::*;
