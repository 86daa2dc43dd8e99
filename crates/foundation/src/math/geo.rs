/// Mean Earth radius (meters) for the spherical distance model.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance between two lat/lon points, in meters.
///
/// Inputs are degrees. Returns 0 for identical points and is symmetric in
/// its arguments up to floating-point rounding.
pub fn distance_meters(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let phi1 = lat1_deg.to_radians();
    let phi2 = lat2_deg.to_radians();
    let d_phi = (lat2_deg - lat1_deg).to_radians();
    let d_lambda = (lon2_deg - lon1_deg).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing (forward azimuth) from point 1 toward point 2, in radians.
///
/// Inputs are degrees. Output lies in (-pi, pi]: 0 is true north, positive
/// is clockwise (east). Not symmetric: the bearing back from point 2 is not
/// the negation of this except over short distances.
pub fn bearing_radians(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let phi1 = lat1_deg.to_radians();
    let phi2 = lat2_deg.to_radians();
    let d_lambda = (lon2_deg - lon1_deg).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    y.atan2(x)
}

#[cfg(test)]
mod tests {
    use super::{EARTH_RADIUS_M, bearing_radians, distance_meters};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn distance_identical_points_is_zero() {
        assert_eq!(distance_meters(-12.0455, -77.0311, -12.0455, -77.0311), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = distance_meters(-12.0455, -77.0311, -12.0460, -77.0305);
        let ba = distance_meters(-12.0460, -77.0305, -12.0455, -77.0311);
        assert_close(ab, ba, ab.abs() * 1e-6);
    }

    #[test]
    fn distance_one_degree_of_latitude() {
        // One degree of latitude on the sphere: R * pi / 180.
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert_close(d, EARTH_RADIUS_M * PI / 180.0, 1e-6);
    }

    #[test]
    fn distance_adds_along_a_meridian() {
        let ab = distance_meters(0.0, 10.0, 0.01, 10.0);
        let bc = distance_meters(0.01, 10.0, 0.025, 10.0);
        let ac = distance_meters(0.0, 10.0, 0.025, 10.0);
        assert_close(ac, ab + bc, 1e-6);
    }

    #[test]
    fn bearing_cardinal_directions() {
        assert_close(bearing_radians(0.0, 0.0, 1.0, 0.0), 0.0, 1e-12);
        assert_close(bearing_radians(0.0, 0.0, 0.0, 1.0), FRAC_PI_2, 1e-12);
        assert_close(bearing_radians(1.0, 0.0, 0.0, 0.0), PI, 1e-12);
        assert_close(bearing_radians(0.0, 1.0, 0.0, 0.0), -FRAC_PI_2, 1e-12);
    }

    #[test]
    fn bearing_stays_in_half_open_range() {
        let coords = [
            (0.0, 0.0),
            (45.0, 90.0),
            (-33.9, 18.4),
            (-12.0455, -77.0311),
            (89.9, 179.9),
            (-89.9, -179.9),
        ];
        for &(lat1, lon1) in &coords {
            for &(lat2, lon2) in &coords {
                if (lat1, lon1) == (lat2, lon2) {
                    continue;
                }
                let b = bearing_radians(lat1, lon1, lat2, lon2);
                assert!(b > -PI - 1e-12 && b <= PI, "bearing {b} out of range");
            }
        }
    }

    #[test]
    fn bearing_short_east_hop_near_equator() {
        // ~33 m east along the equator.
        let b = bearing_radians(0.0, 0.0, 0.0, 0.0003);
        assert_close(b, FRAC_PI_2, 1e-6);
    }
}
