//! Fits on noisy data from a seeded generator.

use findpeaks_rs::search::MariscottiDetector;
use findpeaks_rs::smoothing::BoxcarSmoother;
use findpeaks_rs::table::BAD_FIT_CHI2;
use findpeaks_rs::{FindPeaks, FindPeaksConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::test_helpers::{gaussian, grid, workspace};

/// Gaussian counts with a Gaussian approximation to Poisson noise.
fn noisy(x: &[f64], truth: impl Fn(f64) -> f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    x.iter()
        .map(|&x| {
            let mean = truth(x);
            let noise = Normal::new(0.0, mean.sqrt()).unwrap();
            (mean + noise.sample(&mut rng)).max(0.0)
        })
        .collect()
}

#[test]
fn test_noisy_peak_at_given_centre() {
    let x = grid(0.0, 0.05, 201);
    for seed in [7, 42, 1234] {
        let y = noisy(&x, |x| 200.0 + gaussian(x, 100.0, 5.0, 0.5), seed);
        let config = FindPeaksConfig::new().with_peak_positions(vec![5.0]);
        let table = FindPeaks::new(config)
            .unwrap()
            .execute(&workspace(x.clone(), y))
            .unwrap();

        let row = &table.rows()[0];
        assert!(row.good, "seed {}: {:?}", seed, row);
        assert!((row.effective.centre - 5.0).abs() < 0.1, "seed {}: {:?}", seed, row);
        assert!(row.effective.width > 0.35 && row.effective.width < 0.7, "seed {}: {:?}", seed, row);
        assert!(row.effective.height > 70.0 && row.effective.height < 130.0, "seed {}: {:?}", seed, row);
        assert!(row.chi_squared < 3.0, "seed {}: {:?}", seed, row);
    }
}

#[test]
fn test_noise_without_peak_gives_bad_row() {
    let x = grid(0.0, 0.05, 201);
    for seed in [3, 17, 99] {
        let y = noisy(&x, |_| 100.0, seed);
        for high_background in [true, false] {
            let config = FindPeaksConfig::new()
                .with_peak_positions(vec![5.0])
                .with_peak_height_tolerance(0.01)
                .with_high_background(high_background);
            let table = FindPeaks::new(config)
                .unwrap()
                .execute(&workspace(x.clone(), y.clone()))
                .unwrap();

            assert_eq!(table.len(), 1);
            let row = &table.rows()[0];
            assert!(!row.good, "seed {}: {:?}", seed, row);
            assert_eq!(row.chi_squared, BAD_FIT_CHI2);
            assert_eq!(table.row_values(0).unwrap(), vec![0.0; 6]);
        }
    }
}

#[test]
fn test_detector_candidates_are_ordered() {
    let x = grid(0.0, 1.0, 400);
    for seed in 0..10 {
        let y = noisy(
            &x,
            |x| {
                30.0 + gaussian(x, 400.0, 80.0, 7.0)
                    + gaussian(x, 150.0, 200.0, 9.0)
                    + gaussian(x, 600.0, 390.0, 6.0)
            },
            seed,
        );
        let e: Vec<f64> = y.iter().map(|&v| if v >= 1.0 { v.sqrt() } else { 1.0 }).collect();

        let candidates = MariscottiDetector::new(7, 4)
            .detect(&BoxcarSmoother, &y, &e)
            .unwrap();
        for c in candidates {
            assert!(c.left <= c.centre && c.centre <= c.right, "seed {}: {:?}", seed, c);
            assert!(c.right < y.len(), "seed {}: {:?}", seed, c);
        }
    }
}
