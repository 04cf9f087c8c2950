//! Fits at given peak positions.

use approx::assert_relative_eq;
use findpeaks_rs::models::GAUSSIAN_FWHM_PER_SIGMA;
use findpeaks_rs::{BackgroundType, FindPeaks, FindPeaksConfig, Spectrum, Workspace2D};

use crate::test_helpers::{gaussian, grid, lorentzian, single_peak, workspace};

#[test]
fn test_single_peak_at_given_centre() {
    let config = FindPeaksConfig::new().with_peak_positions(vec![5.0]);
    let table = FindPeaks::new(config).unwrap().execute(&single_peak()).unwrap();

    assert_eq!(table.len(), 1);
    let row = &table.rows()[0];
    assert!(row.good);
    assert_eq!(row.spectrum, 0);

    let values = table.row_values(0).unwrap();
    assert_relative_eq!(values[0], 5.0, epsilon = 1e-3);
    assert_relative_eq!(values[2], 50.0, max_relative = 1e-3);
    assert_relative_eq!(values[3], 10.0, max_relative = 1e-3);
    assert!(row.chi_squared < 1e-2);
}

#[test]
fn test_round_trip_without_high_background() {
    let x = grid(0.0, 0.05, 201);
    let y = x
        .iter()
        .map(|&x| 10.0 + 0.5 * x + gaussian(x, 50.0, 5.0, 0.5))
        .collect();
    let config = FindPeaksConfig::new()
        .with_peak_positions(vec![5.0])
        .with_high_background(false)
        .with_background_type(BackgroundType::Linear);

    let table = FindPeaks::new(config).unwrap().execute(&workspace(x, y)).unwrap();
    let row = &table.rows()[0];
    assert!(row.good);
    assert_relative_eq!(row.effective.height, 50.0, max_relative = 1e-3);
    assert_relative_eq!(row.effective.centre, 5.0, max_relative = 1e-3);
    assert_relative_eq!(row.effective.width, 0.5, max_relative = 1e-3);
    assert_relative_eq!(row.effective.a0, 10.0, max_relative = 1e-3);
    assert_relative_eq!(row.effective.a1, 0.5, max_relative = 1e-3);
    assert_relative_eq!(row.effective.a2, 0.0);
    assert!(row.chi_squared < 1e-6);
}

#[test]
fn test_fit_window_moves_centre_to_maximum() {
    let config = FindPeaksConfig::new()
        .with_peak_positions(vec![4.5])
        .with_fit_windows(vec![4.0, 6.0]);
    let table = FindPeaks::new(config).unwrap().execute(&single_peak()).unwrap();

    let row = &table.rows()[0];
    assert!(row.good);
    assert_relative_eq!(row.effective.centre, 5.0, epsilon = 1e-3);
    assert_relative_eq!(row.effective.height, 50.0, max_relative = 1e-3);
}

#[test]
fn test_raw_parameters() {
    let config = FindPeaksConfig::new()
        .with_peak_positions(vec![5.0])
        .with_raw_peak_parameters(true);
    let table = FindPeaks::new(config).unwrap().execute(&single_peak()).unwrap();

    assert_eq!(
        table.columns(),
        vec!["spectrum", "f0.Height", "f0.PeakCentre", "f0.Sigma", "f1.A0", "f1.A1", "chi2"]
    );
    let values = table.row_values(0).unwrap();
    assert_eq!(values.len(), 5);
    assert_relative_eq!(values[0], 50.0, max_relative = 1e-3);
    assert_relative_eq!(values[1], 5.0, epsilon = 1e-3);
    assert_relative_eq!(values[2].abs(), 0.5 / GAUSSIAN_FWHM_PER_SIGMA, max_relative = 1e-3);
}

#[test]
fn test_lorentzian_peak() {
    let x = grid(0.0, 0.05, 201);
    let y = x.iter().map(|&x| 10.0 + lorentzian(x, 40.0, 5.0, 0.4)).collect();
    let config = FindPeaksConfig::new()
        .with_peak_positions(vec![5.0])
        .with_peak_function("Lorentzian")
        .with_high_background(false);

    let table = FindPeaks::new(config).unwrap().execute(&workspace(x, y)).unwrap();
    let row = &table.rows()[0];
    assert!(row.good);
    assert_relative_eq!(row.effective.centre, 5.0, epsilon = 1e-3);
    assert_relative_eq!(row.effective.height, 40.0, max_relative = 1e-3);
    assert_relative_eq!(row.effective.width, 0.4, max_relative = 1e-3);
}

#[test]
fn test_workspace_index_selects_spectrum() {
    let x = grid(0.0, 0.05, 201);
    let spectra = [4.0, 6.0]
        .iter()
        .map(|&centre| {
            let y = x.iter().map(|&x| 10.0 + gaussian(x, 50.0, centre, 0.5)).collect();
            Spectrum::with_counting_errors(x.clone(), y).unwrap()
        })
        .collect();
    let workspace = Workspace2D::new(spectra).unwrap();

    let config = FindPeaksConfig::new().with_peak_positions(vec![6.0]);
    let all = FindPeaks::new(config.clone()).unwrap().execute(&workspace).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.rows()[0].spectrum, 0);
    assert_eq!(all.rows()[1].spectrum, 1);
    assert!(all.rows()[1].good);

    let one = FindPeaks::new(config.with_workspace_index(1))
        .unwrap()
        .execute(&workspace)
        .unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one.rows()[0].spectrum, 1);
    assert_relative_eq!(one.rows()[0].effective.centre, 6.0, epsilon = 1e-3);
}

#[test]
fn test_histogram_data_fits_bin_centres() {
    let edges = grid(0.0, 0.05, 202);
    let y: Vec<f64> = edges
        .windows(2)
        .map(|w| 10.0 + gaussian(0.5 * (w[0] + w[1]), 50.0, 5.025, 0.5))
        .collect();
    let workspace = Workspace2D::from_spectrum(Spectrum::with_counting_errors(edges, y).unwrap());

    let config = FindPeaksConfig::new().with_peak_positions(vec![5.025]);
    let table = FindPeaks::new(config).unwrap().execute(&workspace).unwrap();
    let row = &table.rows()[0];
    assert!(row.good);
    assert_relative_eq!(row.effective.centre, 5.025, epsilon = 1e-3);
    assert_relative_eq!(row.effective.height, 50.0, max_relative = 1e-3);
}
