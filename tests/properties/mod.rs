//! Invariants checked over many random inputs.

use findpeaks_rs::locator::{candidate_from_centre, candidate_from_window, nearest_index};
use findpeaks_rs::search::{compute_phi, second_difference};
use findpeaks_rs::smoothing::{smooth_passes, BoxcarSmoother, Smoother};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn sorted_grid(rng: &mut ChaCha8Rng, n: usize) -> Vec<f64> {
    let mut x = Vec::with_capacity(n);
    let mut value = rng.gen_range(-10.0..10.0);
    for _ in 0..n {
        value += rng.gen_range(0.01..2.0);
        x.push(value);
    }
    x
}

#[test]
fn test_nearest_index_is_closest() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..200 {
        let n = rng.gen_range(1..40);
        let x = sorted_grid(&mut rng, n);
        let v = rng.gen_range(x[0] - 5.0..x[n - 1] + 5.0);

        let i = nearest_index(&x, v);
        let best = (x[i] - v).abs();
        for (j, xj) in x.iter().enumerate() {
            let d = (xj - v).abs();
            assert!(best <= d, "x = {:?}, v = {}, got {} but {} is closer", x, v, i, j);
            if d == best {
                assert!(i <= j);
            }
        }
    }
}

#[test]
fn test_candidates_are_ordered_and_in_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(23);
    for _ in 0..200 {
        let n = rng.gen_range(3..60);
        let x = sorted_grid(&mut rng, n);
        let y: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..100.0)).collect();
        let last = n - 1;
        let centre = rng.gen_range(x[0]..x[last]);
        let fwhm = rng.gen_range(1..12);

        let c = candidate_from_centre(&x, centre, fwhm, last);
        assert!(c.left <= c.centre && c.centre <= c.right && c.right <= last, "{:?}", c);

        let a = rng.gen_range(x[0] - 1.0..x[last] + 1.0);
        let b = rng.gen_range(x[0] - 1.0..x[last] + 1.0);
        let c = candidate_from_window(&x, &y, centre, a, b, last);
        assert!(c.left <= c.centre && c.centre <= c.right && c.right <= last, "{:?}", c);
    }
}

#[test]
fn test_phi_without_passes() {
    for w in [1, 2, 3, 9, 25, 101] {
        assert_eq!(compute_phi(w, 0).unwrap(), 6);
    }
}

#[test]
fn test_unit_boxcar_is_identity() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let signal: Vec<f64> = (0..64).map(|_| rng.gen_range(-1e3..1e3)).collect();
    assert_eq!(BoxcarSmoother.smooth(&signal, 1).unwrap(), signal);
    assert_eq!(smooth_passes(&BoxcarSmoother, &signal, 1, 5).unwrap(), signal);
}

#[test]
fn test_second_difference_of_line_vanishes() {
    let y: Vec<f64> = (0..20).map(|i| 3.0 + 2.0 * i as f64).collect();
    let s = second_difference(&y);
    assert_eq!(s.len(), y.len());
    assert!(s.iter().all(|v| v.abs() < 1e-12));
}
