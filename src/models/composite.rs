//! Peak plus background, combined additively.

use crate::error::{FindPeaksError, Result};
use crate::model::Model;
use crate::models::background::{BackgroundFunction, BackgroundType};
use crate::models::peak::{PeakFunction, PeakShape};
use crate::parameters::{Parameter, Parameters};
use ndarray::{Array1, Array2};

const PEAK_PREFIX: &str = "f0.";
const BACKGROUND_PREFIX: &str = "f1.";

/// An optional peak plus a polynomial background.
///
/// Parameters are laid out peak first, then background. With a peak present
/// the raw names carry `f0.`/`f1.` prefixes, e.g. `f0.Height` and `f1.A0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeFunction {
    peak_shape: Option<PeakShape>,
    background_kind: BackgroundType,
    params: Parameters,
}

impl CompositeFunction {
    /// Combine a peak and a background, copying their values and fix flags.
    pub fn new(peak: Option<&PeakFunction>, background: &BackgroundFunction) -> Self {
        let mut params = Parameters::new();
        let background_prefix = if peak.is_some() { BACKGROUND_PREFIX } else { "" };

        if let Some(peak) = peak {
            push_prefixed(&mut params, PEAK_PREFIX, peak.parameters());
        }
        push_prefixed(&mut params, background_prefix, background.parameters());

        Self {
            peak_shape: peak.map(|p| p.shape()),
            background_kind: background.kind(),
            params,
        }
    }

    /// A background-only composite.
    pub fn background_only(background: &BackgroundFunction) -> Self {
        Self::new(None, background)
    }

    fn peak_len(&self) -> usize {
        if self.peak_shape.is_some() {
            3
        } else {
            0
        }
    }

    /// Whether a peak member is present.
    pub fn has_peak(&self) -> bool {
        self.peak_shape.is_some()
    }

    /// The peak member with the current values.
    pub fn peak(&self) -> Option<PeakFunction> {
        let shape = self.peak_shape?;
        let mut peak = PeakFunction::new(shape);
        copy_into(peak.parameters_mut(), self.params.iter().take(3));
        Some(peak)
    }

    /// The background member with the current values.
    pub fn background(&self) -> BackgroundFunction {
        let mut background = BackgroundFunction::new(self.background_kind);
        copy_into(
            background.parameters_mut(),
            self.params.iter().skip(self.peak_len()),
        );
        background
    }

    /// Hold every background coefficient fixed.
    pub fn fix_background(&mut self) {
        self.set_background_vary(false);
    }

    /// Let every background coefficient vary.
    pub fn unfix_background(&mut self) {
        self.set_background_vary(true);
    }

    fn set_background_vary(&mut self, vary: bool) {
        let offset = self.peak_len();
        for i in offset..self.params.len() {
            if let Some(p) = self.params.get_index_mut(i) {
                p.set_vary(vary);
            }
        }
    }
}

fn push_prefixed(target: &mut Parameters, prefix: &str, source: &Parameters) {
    for p in source.iter() {
        let mut param = Parameter::new(&format!("{}{}", prefix, p.name()), p.value());
        param.set_vary(p.vary());
        // prefixes keep member names distinct
        let _ = target.add(param);
    }
}

fn copy_into<'a>(target: &mut Parameters, source: impl Iterator<Item = &'a Parameter>) {
    for (i, p) in source.enumerate() {
        if let Some(slot) = target.get_index_mut(i) {
            slot.set_value(p.value());
            slot.set_vary(p.vary());
        }
    }
}

impl Model for CompositeFunction {
    fn name(&self) -> String {
        match self.peak_shape {
            Some(shape) => format!("{}+{}Background", shape, self.background_kind),
            None => format!("{}Background", self.background_kind),
        }
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn eval_with(&self, values: &[f64], x: &Array1<f64>) -> Result<Array1<f64>> {
        if values.len() != self.params.len() {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "{} takes {} parameters, got {}",
                self.name(),
                self.params.len(),
                values.len()
            )));
        }
        let split = self.peak_len();
        let mut y = BackgroundFunction::eval_values(&values[split..], x);
        if let Some(shape) = self.peak_shape {
            y += &PeakFunction::eval_values(shape, &values[..split], x);
        }
        Ok(y)
    }

    fn jacobian_with(&self, values: &[f64], x: &Array1<f64>) -> Result<Array2<f64>> {
        if values.len() != self.params.len() {
            return Err(FindPeaksError::DimensionMismatch(format!(
                "{} takes {} parameters, got {}",
                self.name(),
                self.params.len(),
                values.len()
            )));
        }
        let split = self.peak_len();
        let mut jac = Array2::zeros((x.len(), self.params.len()));
        if let Some(shape) = self.peak_shape {
            PeakFunction::jacobian_values(shape, &values[..split], x, &mut jac, 0);
        }
        BackgroundFunction::jacobian_values(self.background_kind.order_count(), x, &mut jac, split);
        Ok(jac)
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}
