//! Benchmarks for the peak search and fitting pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use findpeaks_rs::models::GAUSSIAN_FWHM_PER_SIGMA;
use findpeaks_rs::search::MariscottiDetector;
use findpeaks_rs::smoothing::BoxcarSmoother;
use findpeaks_rs::{FindPeaks, FindPeaksConfig, Spectrum, Workspace2D};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

fn gaussian(x: f64, height: f64, centre: f64, fwhm: f64) -> f64 {
    let sigma = fwhm / GAUSSIAN_FWHM_PER_SIGMA;
    height * (-0.5 * ((x - centre) / sigma).powi(2)).exp()
}

/// `n` noisy spectra of 1000 bins with five peaks each.
fn workspace(n: usize) -> Workspace2D {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let x: Vec<f64> = (0..1000).map(|i| i as f64).collect();
    let spectra = (0..n)
        .map(|_| {
            let y: Vec<f64> = x
                .iter()
                .map(|&x| {
                    let mean = 50.0
                        + (1..=5)
                            .map(|k| gaussian(x, 300.0 * k as f64, 160.0 * k as f64, 7.0))
                            .sum::<f64>();
                    let noise = Normal::new(0.0, mean.sqrt()).map_or(0.0, |d| d.sample(&mut rng));
                    (mean + noise).max(0.0)
                })
                .collect();
            Spectrum::with_counting_errors(x.clone(), y).unwrap()
        })
        .collect();
    Workspace2D::new(spectra).unwrap()
}

fn bench_detector(c: &mut Criterion) {
    let ws = workspace(1);
    let spectrum = ws.spectrum(0).unwrap();
    let detector = MariscottiDetector::new(7, 4);

    c.bench_function("mariscotti_detect_1000_bins", |b| {
        b.iter(|| {
            detector
                .detect(&BoxcarSmoother, black_box(spectrum.y()), black_box(spectrum.e()))
                .unwrap()
        })
    });
}

fn bench_find_peaks(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_peaks");
    group.sample_size(10);

    for n in [1, 8] {
        let ws = workspace(n);
        for high_background in [false, true] {
            let finder =
                FindPeaks::new(FindPeaksConfig::new().with_high_background(high_background)).unwrap();
            let label = if high_background { "high_background" } else { "one_step" };
            group.bench_with_input(BenchmarkId::new(label, n), &ws, |b, ws| {
                b.iter(|| finder.execute(black_box(ws)).unwrap())
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_detector, bench_find_peaks);
criterion_main!(benches);
