use crate::error::PcaError;
use ndarray::ArrayView1;

fn check_lengths(y_true: &ArrayView1<f64>, y_pred: &ArrayView1<f64>) -> anyhow::Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(PcaError::DimensionMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        }
        .into());
    }
    if y_true.is_empty() {
        return Err(PcaError::EmptyDataset.into());
    }
    Ok(())
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// A constant target has no variance to explain: a perfect prediction scores 1.0 and
/// anything else 0.0.
pub fn r2_score(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> anyhow::Result<f64> {
    check_lengths(&y_true, &y_pred)?;
    let mean = y_true.sum() / y_true.len() as f64;

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

pub fn mean_squared_error(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> anyhow::Result<f64> {
    check_lengths(&y_true, &y_pred)?;
    let sse: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(sse / y_true.len() as f64)
}
