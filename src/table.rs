//! The result table: one row per processed candidate.
//!
//! Rows carry both the effective descriptors (a fixed record) and the raw
//! parameter list of the fitted function. Which of the two the table shows
//! is decided by its [`ParameterLayout`].

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Model;
use crate::models::{BackgroundType, CompositeFunction, PeakShape};

/// Chi-squared written for rows without a usable fit.
pub const BAD_FIT_CHI2: f64 = 1e10;

/// Column names of the effective layout, after the spectrum column.
pub const EFFECTIVE_COLUMNS: [&str; 6] = [
    "centre",
    "width",
    "height",
    "backgroundintercept",
    "backgroundslope",
    "A2",
];

/// Peak descriptors independent of the peak shape, plus the background
/// polynomial. Orders the background does not have are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectiveParameters {
    pub centre: f64,
    pub width: f64,
    pub height: f64,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

impl EffectiveParameters {
    /// Read the descriptors of a fitted composite.
    pub fn from_function(function: &CompositeFunction) -> Self {
        let background = function.background();
        let mut params = Self {
            a0: background.coefficient(0),
            a1: background.coefficient(1),
            a2: background.coefficient(2),
            ..Self::default()
        };
        if let Some(peak) = function.peak() {
            params.centre = peak.centre();
            params.width = peak.fwhm();
            params.height = peak.height();
        }
        params
    }

    /// The six values in column order.
    pub fn to_array(&self) -> [f64; 6] {
        [self.centre, self.width, self.height, self.a0, self.a1, self.a2]
    }

    /// Whether any value is NaN.
    pub fn has_nan(&self) -> bool {
        self.to_array().iter().any(|v| v.is_nan())
    }
}

/// Which parameters the table reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterLayout {
    /// The six effective columns
    Effective,
    /// The raw parameters of the fitted function, by name
    Raw(Vec<String>),
}

impl ParameterLayout {
    /// Raw layout for a peak shape over a background.
    pub fn raw_for(shape: PeakShape, background: BackgroundType) -> Self {
        let names = shape
            .parameter_names()
            .iter()
            .map(|n| format!("f0.{}", n))
            .chain(background.parameter_names().iter().map(|n| format!("f1.{}", n)))
            .collect();
        ParameterLayout::Raw(names)
    }

    /// Number of parameter columns.
    pub fn width(&self) -> usize {
        match self {
            ParameterLayout::Effective => EFFECTIVE_COLUMNS.len(),
            ParameterLayout::Raw(names) => names.len(),
        }
    }
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakRow {
    pub spectrum: usize,
    pub effective: EffectiveParameters,
    pub raw: Vec<f64>,
    pub chi_squared: f64,
    pub good: bool,
}

impl PeakRow {
    /// A row for a fitted function.
    ///
    /// The row is bad when the centre lies outside `[x_min, x_max]` or the
    /// function has no peak.
    pub fn from_fit(
        spectrum: usize,
        function: &CompositeFunction,
        chi_squared: f64,
        x_min: f64,
        x_max: f64,
    ) -> Self {
        let effective = EffectiveParameters::from_function(function);
        let raw = function.parameters().values();
        let out_of_range = effective.centre < x_min || effective.centre > x_max;
        if !function.has_peak() || raw.is_empty() || out_of_range {
            warn!(
                "No good fit obtained for spectrum {}: chi2 = {}, centre = {}{}",
                spectrum,
                chi_squared,
                effective.centre,
                if out_of_range { " (out of range)" } else { "" }
            );
            return Self::bad(spectrum);
        }
        info!(
            "Spectrum {}: centre = {}, width = {}, height = {}, chi2 = {}",
            spectrum, effective.centre, effective.width, effective.height, chi_squared
        );
        Self {
            spectrum,
            effective,
            raw,
            chi_squared,
            good: true,
        }
    }

    /// A row recording that no acceptable fit was found.
    pub fn bad(spectrum: usize) -> Self {
        Self {
            spectrum,
            effective: EffectiveParameters::default(),
            raw: Vec::new(),
            chi_squared: BAD_FIT_CHI2,
            good: false,
        }
    }

    /// Parameter values under a layout. Bad rows are zero filled.
    pub fn values(&self, layout: &ParameterLayout) -> Vec<f64> {
        if !self.good {
            return vec![0.0; layout.width()];
        }
        match layout {
            ParameterLayout::Effective => self.effective.to_array().to_vec(),
            ParameterLayout::Raw(names) => {
                let mut values = self.raw.clone();
                values.resize(names.len(), 0.0);
                values
            }
        }
    }
}

/// Ordered collection of result rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakTable {
    layout: ParameterLayout,
    rows: Vec<PeakRow>,
}

#[derive(Serialize)]
struct TableExport {
    columns: Vec<String>,
    rows: Vec<RowExport>,
}

#[derive(Serialize)]
struct RowExport {
    spectrum: usize,
    values: Vec<f64>,
    chi2: f64,
}

impl PeakTable {
    pub fn new(layout: ParameterLayout) -> Self {
        Self {
            layout,
            rows: Vec::new(),
        }
    }

    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    /// Column names: spectrum, the layout's parameters, chi2.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec!["spectrum".to_string()];
        match &self.layout {
            ParameterLayout::Effective => {
                columns.extend(EFFECTIVE_COLUMNS.iter().map(|c| c.to_string()))
            }
            ParameterLayout::Raw(names) => columns.extend(names.iter().cloned()),
        }
        columns.push("chi2".to_string());
        columns
    }

    /// Append a row. Rows are never modified afterwards.
    pub fn push(&mut self, row: PeakRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[PeakRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parameter values of row `index` under the table layout.
    pub fn row_values(&self, index: usize) -> Option<Vec<f64>> {
        self.rows.get(index).map(|row| row.values(&self.layout))
    }

    /// Rows with an accepted fit.
    pub fn good_rows(&self) -> impl Iterator<Item = &PeakRow> {
        self.rows.iter().filter(|row| row.good)
    }

    /// Serialize the visible table as JSON.
    pub fn to_json(&self) -> Result<String> {
        let export = TableExport {
            columns: self.columns(),
            rows: self
                .rows
                .iter()
                .map(|row| RowExport {
                    spectrum: row.spectrum,
                    values: row.values(&self.layout),
                    chi2: row.chi_squared,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackgroundFunction, PeakFunction};
    use approx::assert_relative_eq;

    fn fitted() -> CompositeFunction {
        let peak = PeakFunction::with_shape(PeakShape::Gaussian, 5.0, 50.0, 0.5);
        let mut bg = BackgroundFunction::new(BackgroundType::Linear);
        bg.set_coefficient(0, 10.0);
        bg.set_coefficient(1, 0.1);
        CompositeFunction::new(Some(&peak), &bg)
    }

    #[test]
    fn test_effective_parameters() {
        let eff = EffectiveParameters::from_function(&fitted());
        assert_relative_eq!(eff.centre, 5.0);
        assert_relative_eq!(eff.width, 0.5, epsilon = 1e-12);
        assert_relative_eq!(eff.height, 50.0);
        assert_relative_eq!(eff.a0, 10.0);
        assert_relative_eq!(eff.a1, 0.1);
        assert_relative_eq!(eff.a2, 0.0);
    }

    #[test]
    fn test_out_of_range_centre_gives_bad_row() {
        let row = PeakRow::from_fit(3, &fitted(), 0.5, 0.0, 4.0);
        assert!(!row.good);
        assert_eq!(row.spectrum, 3);
        assert_relative_eq!(row.chi_squared, BAD_FIT_CHI2);
        assert_eq!(row.values(&ParameterLayout::Effective), vec![0.0; 6]);
    }

    #[test]
    fn test_layouts() {
        let row = PeakRow::from_fit(0, &fitted(), 0.5, 0.0, 10.0);
        assert!(row.good);

        let raw = ParameterLayout::raw_for(PeakShape::Gaussian, BackgroundType::Linear);
        let mut table = PeakTable::new(raw.clone());
        table.push(row.clone());
        table.push(PeakRow::bad(1));

        assert_eq!(
            table.columns(),
            vec!["spectrum", "f0.Height", "f0.PeakCentre", "f0.Sigma", "f1.A0", "f1.A1", "chi2"]
        );
        assert_eq!(table.row_values(0).unwrap().len(), 5);
        assert_relative_eq!(table.row_values(0).unwrap()[0], 50.0);
        assert_eq!(table.row_values(1).unwrap(), vec![0.0; 5]);
        assert_eq!(table.good_rows().count(), 1);

        let table = PeakTable::new(ParameterLayout::Effective);
        assert_eq!(table.columns().len(), 8);
        assert_eq!(table.columns()[4], "backgroundintercept");
    }

    #[test]
    fn test_json_export() {
        let mut table = PeakTable::new(ParameterLayout::Effective);
        table.push(PeakRow::from_fit(0, &fitted(), 0.25, 0.0, 10.0));
        table.push(PeakRow::bad(0));

        let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        assert_eq!(json["columns"][1], "centre");
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["rows"][0]["chi2"], 0.25);
        assert_eq!(json["rows"][1]["chi2"], 1e10);
        assert_eq!(json["rows"][1]["values"][2], 0.0);

        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().any(|k| k.as_str() == "columns"));
        assert!(keys.iter().any(|k| k.as_str() == "rows"));
    }
}
