//! Automatic peak search followed by fitting.

use approx::assert_relative_eq;
use findpeaks_rs::{FindPeaks, FindPeaksConfig};

use crate::test_helpers::{gaussian, grid, workspace};

fn two_peaks() -> findpeaks_rs::Workspace2D {
    let x = grid(0.0, 0.1, 201);
    let y = x
        .iter()
        .map(|&x| 100.0 + gaussian(x, 1000.0, 6.0, 0.7) + gaussian(x, 800.0, 14.0, 0.7))
        .collect();
    workspace(x, y)
}

#[test]
fn test_finds_and_fits_two_peaks() {
    let finder = FindPeaks::new(FindPeaksConfig::new().with_fwhm(7).with_tolerance(4)).unwrap();
    let table = finder.execute(&two_peaks()).unwrap();

    assert_eq!(table.len(), 2);
    for (row, (centre, height)) in table.rows().iter().zip([(6.0, 1000.0), (14.0, 800.0)]) {
        assert!(row.good, "{:?}", row);
        assert_relative_eq!(row.effective.centre, centre, epsilon = 0.3);
        assert_relative_eq!(row.effective.height, height, max_relative = 1e-2);
        assert_relative_eq!(row.effective.width, 0.7, max_relative = 1e-2);
        assert_relative_eq!(row.effective.a0, 100.0, max_relative = 1e-2);
    }
}

#[test]
fn test_search_ignores_tolerances() {
    // the search has no expected positions to compare against
    let config = FindPeaksConfig::new()
        .with_peak_position_tolerance(1e-6)
        .with_peak_height_tolerance(1e-6)
        .with_high_background(false);
    let table = FindPeaks::new(config).unwrap().execute(&two_peaks()).unwrap();

    assert_eq!(table.len(), 2);
    assert!(table.rows().iter().all(|row| row.good));
}

#[test]
fn test_json_export_of_search() {
    let finder = FindPeaks::new(FindPeaksConfig::new()).unwrap();
    let table = finder.execute(&two_peaks()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
    let columns: Vec<&str> = json["columns"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c.as_str())
        .collect();
    assert_eq!(
        columns,
        vec![
            "spectrum",
            "centre",
            "width",
            "height",
            "backgroundintercept",
            "backgroundslope",
            "A2",
            "chi2"
        ]
    );
    assert_eq!(json["rows"].as_array().unwrap().len(), 2);
}
