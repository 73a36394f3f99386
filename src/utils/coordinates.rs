use crate::utils::constants::{MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};

/// Parse a numeric field, treating blanks, non-numbers and non-finite values as null.
pub fn coerce_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a latitude string; out-of-range values are nulled like non-numeric ones.
///
/// # Examples
/// ```
/// use weather_insights::utils::coordinates::coerce_latitude;
///
/// assert_eq!(coerce_latitude(" 51.52 "), Some(51.52));
/// assert_eq!(coerce_latitude("north"), None);
/// assert_eq!(coerce_latitude("91"), None);
/// ```
pub fn coerce_latitude(raw: &str) -> Option<f64> {
    coerce_number(raw).filter(|lat| (MIN_LATITUDE..=MAX_LATITUDE).contains(lat))
}

pub fn coerce_longitude(raw: &str) -> Option<f64> {
    coerce_number(raw).filter(|lon| (MIN_LONGITUDE..=MAX_LONGITUDE).contains(lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("12.5"), Some(12.5));
        assert_eq!(coerce_number(" -3 "), Some(-3.0));
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("n/a"), None);
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_number("inf"), None);
    }

    #[test]
    fn test_coordinate_bounds() {
        assert_eq!(coerce_latitude("-90"), Some(-90.0));
        assert_eq!(coerce_latitude("90"), Some(90.0));
        assert_eq!(coerce_latitude("-90.01"), None);

        assert_eq!(coerce_longitude("180"), Some(180.0));
        assert_eq!(coerce_longitude("-180"), Some(-180.0));
        assert_eq!(coerce_longitude("180.5"), None);
        assert_eq!(coerce_longitude("east"), None);
    }
}
