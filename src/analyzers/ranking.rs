use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{Measure, Observation};
use crate::processors::FilteredView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Largest,
    Smallest,
}

/// The `n` rows with the most extreme value of `measure`.
///
/// Rows with a null value are not ranked. Equal values keep their original
/// row order.
pub fn top_n<'a>(
    view: &FilteredView<'a>,
    measure: Measure,
    n: usize,
    direction: Direction,
) -> Vec<&'a Observation> {
    let mut ranked: Vec<(f64, &'a Observation)> = view
        .iter()
        .filter_map(|row| measure.value(row).map(|value| (value, row)))
        .collect();

    // Vec::sort_by is stable.
    ranked.sort_by(|(a, _), (b, _)| {
        let order = match direction {
            Direction::Largest => b.partial_cmp(a),
            Direction::Smallest => a.partial_cmp(b),
        };
        order.unwrap_or(Ordering::Equal)
    });

    ranked.into_iter().take(n).map(|(_, row)| row).collect()
}
