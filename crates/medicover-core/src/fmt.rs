//! Shared formatting helpers for the sidebar and API responses.

/// Format a cluster radius in meters.
///
/// `>= 1000` -> kilometers with one decimal and no trailing `.0`: `"2.5 km"`, `"10 km"`
/// `< 1000`  -> whole meters: `"850 m"`
pub fn format_radius(meters: f64) -> String {
    if meters >= 1000.0 {
        let km = (meters / 100.0).round() / 10.0;
        format!("{} km", trim_float(km))
    } else {
        format!("{} m", meters.round() as i64)
    }
}

/// Format a surface area given in square meters.
///
/// `>= 1 km²` -> `"12.3 km²"`
/// `< 1 km²`  -> `"5400 m²"`
pub fn format_area(square_meters: f64) -> String {
    if square_meters >= 1_000_000.0 {
        format!("{:.1} km²", square_meters / 1_000_000.0)
    } else {
        format!("{:.0} m²", square_meters)
    }
}

/// Prints `2.0` as `"2"` and `2.5` as `"2.5"`.
fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_radius_meters() {
        assert_eq!(format_radius(0.0), "0 m");
        assert_eq!(format_radius(849.6), "850 m");
        assert_eq!(format_radius(999.4), "999 m");
    }

    #[test]
    fn test_format_radius_kilometers() {
        assert_eq!(format_radius(1000.0), "1 km");
        assert_eq!(format_radius(2549.0), "2.5 km");
        assert_eq!(format_radius(2551.0), "2.6 km");
        assert_eq!(format_radius(10_000.0), "10 km");
    }

    #[test]
    fn test_format_area() {
        assert_eq!(format_area(5400.4), "5400 m²");
        assert_eq!(format_area(12_345_678.0), "12.3 km²");
    }
}
