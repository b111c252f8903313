//! Spec §8 scenario 2: region decode of a window agrees with the
//! corresponding crop of the full decode.

mod common;

use j2k_core::{ComponentInput, Decoder, MctKind, RawCoefficientCodec, Rect, WaveletKind};

fn single_component_image(tile_rect: Rect, seed: u64) -> ComponentInput {
  let coding = common::coding_params(3, WaveletKind::Reversible53);
  let mut rng = common::Lcg::new(seed);
  let plane: Vec<i32> = (0..tile_rect.area()).map(|_| rng.next_range(-100, 100)).collect();
  common::encode_component(&plane, tile_rect, 9, true, 0, &coding)
}

#[test]
fn windowed_decode_matches_crop_of_full_decode() {
  let tile_rect = Rect::new(0, 0, 32, 32);
  let coding = common::coding_params(3, WaveletKind::Reversible53);

  let full_comp = single_component_image(tile_rect, 7);
  let mut full_decoder = Decoder::new(RawCoefficientCodec, 1).unwrap();
  full_decoder.read_header(
    j2k_core::ImageGeometry {
      rect: tile_rect,
      num_comps: 1,
      comp_prec: vec![9],
      comp_sgnd: vec![true],
    },
    coding.clone(),
  );
  let full_image = full_decoder.decompress_tile(vec![full_comp], MctKind::None).unwrap();
  assert_eq!(full_image.comps[0].w, 32);
  assert_eq!(full_image.comps[0].h, 32);

  let windowed_comp = single_component_image(tile_rect, 7);
  let mut windowed_decoder = Decoder::new(RawCoefficientCodec, 1).unwrap();
  windowed_decoder.read_header(
    j2k_core::ImageGeometry {
      rect: tile_rect,
      num_comps: 1,
      comp_prec: vec![9],
      comp_sgnd: vec![true],
    },
    coding,
  );
  windowed_decoder.set_window(Rect::new(0, 0, 8, 8));
  let windowed_image = windowed_decoder.decompress_tile(vec![windowed_comp], MctKind::None).unwrap();
  assert_eq!(windowed_image.comps[0].w, 8);
  assert_eq!(windowed_image.comps[0].h, 8);

  let full_data = full_image.comps[0].data();
  let windowed_data = windowed_image.comps[0].data();
  for y in 0..8usize {
    for x in 0..8usize {
      assert_eq!(windowed_data[y * 8 + x], full_data[y * 32 + x], "mismatch at ({x},{y})");
    }
  }
}
