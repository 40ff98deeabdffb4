use heightbars::{ChartError, HeightGrid, LightSource};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod grid_tests {
  use super::*;

  mod parsing {
    use super::*;

    #[test]
    fn parses_json_rows() {
      let grid = HeightGrid::from_json("[[1, 2.5], [3, 4]]").unwrap();
      assert_eq!((grid.rows(), grid.cols()), (2, 2));
      assert_eq!(grid.get(0, 1), Some(2.5));
      assert_eq!(grid.values(), &[1.0, 2.5, 3.0, 4.0]);
    }

    #[test]
    fn rejects_ragged_rows() {
      let err = HeightGrid::from_json("[[1, 2, 3], [4, 5]]").unwrap_err();
      assert!(matches!(
        err,
        ChartError::RaggedGrid {
          row: 1,
          expected: 3,
          found: 2
        }
      ));
    }

    #[test]
    fn rejects_negative_heights() {
      let err = HeightGrid::from_json("[[1, -2]]").unwrap_err();
      assert!(matches!(
        err,
        ChartError::NegativeHeight { row: 0, col: 1, .. }
      ));
    }

    #[test]
    fn rejects_non_numbers() {
      assert!(matches!(
        HeightGrid::from_json("[[1, \"x\"]]"),
        Err(ChartError::InvalidGridJson(_))
      ));
      assert!(matches!(
        HeightGrid::from_json("{\"a\": 1}"),
        Err(ChartError::InvalidGridJson(_))
      ));
      assert!(matches!(
        HeightGrid::from_json("[[1, 2]"),
        Err(ChartError::InvalidGridJson(_))
      ));
    }

    #[test]
    fn rejects_empty() {
      assert!(matches!(
        HeightGrid::from_json("[]"),
        Err(ChartError::EmptyGrid)
      ));
    }

    #[test]
    fn error_messages_name_the_row() {
      let err = HeightGrid::from_json("[[1, 2], [3]]").unwrap_err();
      assert_eq!(err.to_string(), "Row 1 has 1 values, expected 2");
    }
  }

  mod random {
    use super::*;

    #[test]
    fn respects_inclusive_range() {
      let mut rng = ChaCha8Rng::seed_from_u64(9);
      let grid = HeightGrid::random(6, 7, 2, 4, &mut rng).unwrap();
      assert_eq!((grid.rows(), grid.cols()), (6, 7));
      assert!(grid.values().iter().all(|v| (2.0..=4.0).contains(v)));
      assert!(grid.values().iter().all(|v| v.fract() == 0.0));
    }

    #[test]
    fn same_seed_same_grid() {
      let a =
        HeightGrid::random(4, 4, 0, 5, &mut ChaCha8Rng::seed_from_u64(1))
          .unwrap();
      let b =
        HeightGrid::random(4, 4, 0, 5, &mut ChaCha8Rng::seed_from_u64(1))
          .unwrap();
      assert_eq!(a, b);
    }

    #[test]
    fn single_value_range() {
      let mut rng = ChaCha8Rng::seed_from_u64(0);
      let grid = HeightGrid::random(2, 3, 3, 3, &mut rng).unwrap();
      assert!(grid.values().iter().all(|&v| v == 3.0));
    }

    #[test]
    fn huge_dimensions_are_an_error() {
      let mut rng = ChaCha8Rng::seed_from_u64(0);
      assert!(matches!(
        HeightGrid::random(usize::MAX, 2, 0, 5, &mut rng),
        Err(ChartError::GridTooLarge { cols: 2, .. })
      ));
      assert!(matches!(
        HeightGrid::random_continuous(2, usize::MAX, 0.0, 100.0, &mut rng),
        Err(ChartError::GridTooLarge { rows: 2, .. })
      ));
    }

    #[test]
    fn continuous_heights_stay_in_range() {
      let mut rng = ChaCha8Rng::seed_from_u64(4);
      let grid =
        HeightGrid::random_continuous(8, 8, 0.0, 100.0, &mut rng).unwrap();
      assert_eq!(grid.len(), 64);
      assert!(grid.values().iter().all(|v| (0.0..100.0).contains(v)));
      assert!(grid.values().iter().any(|v| v.fract() != 0.0));
    }

    #[test]
    fn continuous_range_must_be_finite_and_ordered() {
      let mut rng = ChaCha8Rng::seed_from_u64(0);
      for (min, max) in [(5.0, 1.0), (-1.0, 2.0), (0.0, f64::INFINITY)] {
        assert!(matches!(
          HeightGrid::random_continuous(2, 2, min, max, &mut rng),
          Err(ChartError::InvalidContinuousRange { .. })
        ));
      }
      let flat = HeightGrid::random_continuous(2, 2, 3.0, 3.0, &mut rng);
      assert!(flat.unwrap().values().iter().all(|&v| v == 3.0));
    }

    #[test]
    fn rejects_inverted_range() {
      let mut rng = ChaCha8Rng::seed_from_u64(0);
      assert!(matches!(
        HeightGrid::random(2, 2, 5, 1, &mut rng),
        Err(ChartError::InvalidRandomRange { min: 5, max: 1 })
      ));
      assert!(matches!(
        HeightGrid::random(0, 2, 0, 1, &mut rng),
        Err(ChartError::EmptyGrid)
      ));
    }
  }

  mod hillshade {
    use super::*;

    #[test]
    fn flat_surface_gets_sine_of_altitude() {
      let light = LightSource::default();
      let shade = light.hillshade(&[0.0; 6], 2, 3);
      let expected = 45.0_f64.to_radians().sin();
      assert!(shade.iter().all(|v| (v - expected).abs() < 1e-12));
    }

    #[test]
    fn sloped_surface_spans_unit_interval() {
      let grid = HeightGrid::from_rows(vec![
        vec![7.0, 9.0, 6.0],
        vec![4.0, 2.0, 8.0],
        vec![4.0, 5.0, 2.0],
      ])
      .unwrap();
      let shade = LightSource::default().hillshade(&grid.normalized(), 3, 3);
      let lo = shade.iter().cloned().fold(f64::INFINITY, f64::min);
      let hi = shade.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
      assert!(lo.abs() < 1e-12);
      assert!((hi - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sample_grid_is_lit_from_the_south() {
      // Row 0 is the northern edge; the default light stands due south.
      let grid = HeightGrid::default();
      let shade = LightSource::default().hillshade(&grid.normalized(), 3, 3);
      let expected = [
        0.840284, 1.0, 0.128127, 0.698461, 0.752894, 0.485884, 0.526204, 0.0,
        0.919739,
      ];
      for (k, (got, want)) in shade.iter().zip(expected).enumerate() {
        assert!((got - want).abs() < 1e-5, "cell {k}: {got} != {want}");
      }
    }

    #[test]
    fn northern_light_swaps_bright_and_dark_rows() {
      // The 9 at (0, 1) slopes down to the south, the 5 at (2, 1) slopes
      // down to the north.
      let norm = HeightGrid::default().normalized();
      let south = LightSource::new(180.0, 45.0).hillshade(&norm, 3, 3);
      let north = LightSource::new(0.0, 45.0).hillshade(&norm, 3, 3);
      assert!(south[1] > south[7]);
      assert!(north[7] > north[1]);
    }

    #[test]
    fn single_row_has_no_row_gradient() {
      let light = LightSource::new(90.0, 45.0);
      // A 45 degree slope rising east is grazed by a 45 degree eastern light.
      let shade = light.hillshade(&[0.0, 1.0, 2.0], 1, 3);
      assert_eq!(shade.len(), 3);
      assert!(shade.iter().all(|v| v.abs() < 1e-12));
    }
  }
}
