/// Discrete second difference `S[j] = Y[j-1] - 2·Y[j] + Y[j+1]`.
///
/// The first and last points are left at zero; a peak can never be found
/// that close to the edge anyway.
pub fn second_difference(y: &[f64]) -> Vec<f64> {
    let mut s = vec![0.0; y.len()];
    for j in 1..y.len().saturating_sub(1) {
        s[j] = y[j - 1] - 2.0 * y[j] + y[j + 1];
    }
    s
}
