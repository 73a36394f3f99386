use serde::Serialize;

use crate::models::Measure;
use crate::processors::FilteredView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureStats {
    pub measure: Measure,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two values.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Descriptive statistics over the non-null values of `measure`.
pub fn describe(view: &FilteredView<'_>, measure: Measure) -> Option<MeasureStats> {
    let values: Vec<f64> = view.iter().filter_map(|row| measure.value(row)).collect();
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std_dev = (count > 1).then(|| {
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    });
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(MeasureStats {
        measure,
        count,
        mean,
        std_dev,
        min,
        max,
    })
}

/// Pearson correlation of two measures over rows where both are present.
///
/// `None` with fewer than two complete pairs or when either side is constant.
pub fn correlation(view: &FilteredView<'_>, x: Measure, y: Measure) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = view
        .iter()
        .filter_map(|row| Some((x.value(row)?, y.value(row)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub measures: Vec<Measure>,
    /// Row-major, `values[i][j]` is the correlation of `measures[i]` and `measures[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, x: Measure, y: Measure) -> Option<f64> {
        let i = self.measures.iter().position(|m| *m == x)?;
        let j = self.measures.iter().position(|m| *m == y)?;
        self.values[i][j]
    }
}

pub fn correlation_matrix(view: &FilteredView<'_>, measures: &[Measure]) -> CorrelationMatrix {
    let values = measures
        .iter()
        .map(|x| measures.iter().map(|y| correlation(view, *x, *y)).collect())
        .collect();

    CorrelationMatrix {
        measures: measures.to_vec(),
        values,
    }
}
