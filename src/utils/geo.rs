/// Haversine distance in meters between two coordinates.
///
/// Known quirk, kept on purpose: a coordinate equal to 0.0 is read as
/// "no location supplied" and short-circuits to 0.0 instead of computing
/// the real distance. Callers treat 0.0 as "inside the geofence".
pub fn get_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == 0.0 || lon1 == 0.0 || lat2 == 0.0 || lon2 == 0.0 {
        return 0.0;
    }

    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    EARTH_RADIUS_M * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_coordinate_means_no_location_supplied() {
        // Not the true haversine distance: 0 is read as "missing".
        assert_eq!(get_distance_m(0.0, 0.0, 6.366, 2.429), 0.0);
        assert_eq!(get_distance_m(6.366, 0.0, 6.366, 2.429), 0.0);
    }

    #[test]
    fn same_point_is_zero_meters() {
        let d = get_distance_m(6.366132, 2.429160, 6.366132, 2.429160);
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn hundred_meters_north_is_about_hundred_meters() {
        // One degree of latitude is ~111.32 km, so ~0.0009 degrees is ~100 m.
        let d = get_distance_m(6.366132, 2.429160, 6.367032, 2.429160);
        assert!((d - 100.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let there = get_distance_m(6.366132, 2.429160, 6.5, 2.5);
        let back = get_distance_m(6.5, 2.5, 6.366132, 2.429160);
        assert!((there - back).abs() < 1e-9);
    }
}
