//! WGS84 coordinate transformations between geodetic, ECEF and local
//! tangent-plane (ENU) frames
//!
//! Angles are degrees on the public boundary and radians internally. All
//! functions are pure; quadrant handling goes through `atan2` so longitudes
//! stay correct across the antimeridian. The geodetic inverse uses Bowring's
//! single-pass method, which is well below the millimeter for terrestrial
//! heights.

use nalgebra::{Matrix3, Vector3};

/// WGS84 semi-major axis (meters)
pub const EARTH_SEMI_MAJOR_AXIS: f64 = 6378137.0;

/// WGS84 semi-minor axis (meters)
pub const EARTH_SEMI_MINOR_AXIS: f64 = 6356752.3142;

/// WGS84 flattening
pub const EARTH_FLATTENING: f64 =
    (EARTH_SEMI_MAJOR_AXIS - EARTH_SEMI_MINOR_AXIS) / EARTH_SEMI_MAJOR_AXIS;

/// First eccentricity squared
pub const ECCENTRICITY_SQUARED: f64 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);

/// Prime-vertical radius of curvature at the given latitude (radians)
fn prime_vertical_radius(sin_lat: f64) -> f64 {
    EARTH_SEMI_MAJOR_AXIS / (1.0 - ECCENTRICITY_SQUARED * sin_lat * sin_lat).sqrt()
}

/// Rotation from ECEF axis deltas into the East-North-Up frame at the
/// reference latitude/longitude (radians)
fn enu_rotation(sin_lat: f64, cos_lat: f64, sin_lon: f64, cos_lon: f64) -> Matrix3<f64> {
    Matrix3::new(
        -sin_lon,
        cos_lon,
        0.0,
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        cos_lat * cos_lon,
        cos_lat * sin_lon,
        sin_lat,
    )
}

/// Convert geodetic coordinates (degrees, meters) to ECEF (meters).
pub fn geodetic_to_ecef(lat: f64, lon: f64, h: f64) -> (f64, f64, f64) {
    let lat_rad = lat.to_radians();
    let lon_rad = lon.to_radians();

    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let nu = prime_vertical_radius(sin_lat);

    let x = (h + nu) * cos_lat * cos_lon;
    let y = (h + nu) * cos_lat * sin_lon;
    let z = (h + (1.0 - ECCENTRICITY_SQUARED) * nu) * sin_lat;

    (x, y, z)
}

/// Convert ECEF coordinates (meters) to geodetic (degrees, meters) using
/// Bowring's method.
///
/// On the polar axis (x = y = 0) the parametric latitude degenerates and the
/// returned latitude is 0 by contract.
pub fn ecef_to_geodetic(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let a = EARTH_SEMI_MAJOR_AXIS;
    let b = EARTH_SEMI_MINOR_AXIS;
    let e1_sq = ECCENTRICITY_SQUARED;
    // second eccentricity squared = (a^2 - b^2) / b^2
    let e2_sq = e1_sq / (1.0 - e1_sq);

    // distance from the minor axis and polar radius
    let p = (x * x + y * y).sqrt();
    let r = (p * p + z * z).sqrt();

    // parametric latitude (Bowring eqn. 17)
    let tan_beta = (b * z) / (a * p) * (1.0 + e2_sq * b / r);
    let sin_beta = tan_beta / (1.0 + tan_beta * tan_beta).sqrt();
    let cos_beta = sin_beta / tan_beta;

    // geodetic latitude (Bowring eqn. 18); degenerate on the polar axis
    let lat_rad = if cos_beta.is_nan() {
        0.0
    } else {
        (z + e2_sq * b * sin_beta * sin_beta * sin_beta)
            .atan2(p - e1_sq * a * cos_beta * cos_beta * cos_beta)
    };

    let lon_rad = y.atan2(x);

    // height above the ellipsoid (Bowring eqn. 7)
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let nu = prime_vertical_radius(sin_lat);
    let h = p * cos_lat + z * sin_lat - (a * a / nu);

    (lat_rad.to_degrees(), lon_rad.to_degrees(), h)
}

/// Convert ECEF coordinates (meters) to ENU (meters) relative to the given
/// geodetic reference point.
pub fn ecef_to_enu(x: f64, y: f64, z: f64, lat0: f64, lon0: f64, h0: f64) -> (f64, f64, f64) {
    let lat_rad = lat0.to_radians();
    let lon_rad = lon0.to_radians();

    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let (x0, y0, z0) = geodetic_to_ecef(lat0, lon0, h0);
    let delta = Vector3::new(x - x0, y - y0, z - z0);

    let enu = enu_rotation(sin_lat, cos_lat, sin_lon, cos_lon) * delta;
    (enu.x, enu.y, enu.z)
}

/// Convert ENU coordinates (meters) relative to the given geodetic reference
/// point back to ECEF (meters).
pub fn enu_to_ecef(east: f64, north: f64, up: f64, lat0: f64, lon0: f64, h0: f64) -> (f64, f64, f64) {
    let lat_rad = lat0.to_radians();
    let lon_rad = lon0.to_radians();

    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let (x0, y0, z0) = geodetic_to_ecef(lat0, lon0, h0);

    let rotation = enu_rotation(sin_lat, cos_lat, sin_lon, cos_lon);
    let ecef = rotation.transpose() * Vector3::new(east, north, up) + Vector3::new(x0, y0, z0);

    (ecef.x, ecef.y, ecef.z)
}

/// Convert geodetic coordinates to ENU relative to a geodetic reference
/// point.
pub fn geodetic_to_enu(
    lat: f64,
    lon: f64,
    h: f64,
    lat0: f64,
    lon0: f64,
    h0: f64,
) -> (f64, f64, f64) {
    let (x, y, z) = geodetic_to_ecef(lat, lon, h);
    ecef_to_enu(x, y, z, lat0, lon0, h0)
}

/// Convert ENU coordinates relative to a geodetic reference point back to
/// geodetic coordinates.
pub fn enu_to_geodetic(
    east: f64,
    north: f64,
    up: f64,
    lat0: f64,
    lon0: f64,
    h0: f64,
) -> (f64, f64, f64) {
    let (x, y, z) = enu_to_ecef(east, north, up, lat0, lon0, h0);
    ecef_to_geodetic(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // round-trip contract from the protocol: 1e-6 deg, 1e-3 m
    const ANGLE_TOL: f64 = 1e-6;
    const HEIGHT_TOL: f64 = 1e-3;

    #[test]
    fn test_equator_prime_meridian_fixed_point() {
        let (x, y, z) = geodetic_to_ecef(0.0, 0.0, 0.0);
        assert_eq!(x, 6378137.0);
        assert_eq!(y, 0.0);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn test_geodetic_ecef_round_trip_grid() {
        let lats = [-85.0, -60.0, -30.0, -0.5, 0.0, 0.5, 30.0, 47.4, 60.0, 85.0];
        let lons = [-179.9, -135.0, -90.0, -45.0, 0.0, 45.0, 90.0, 135.0, 179.9];
        let heights = [-100.0, 0.0, 10.0, 1000.0, 8848.0];

        for &lat in &lats {
            for &lon in &lons {
                for &h in &heights {
                    let (x, y, z) = geodetic_to_ecef(lat, lon, h);
                    let (lat2, lon2, h2) = ecef_to_geodetic(x, y, z);
                    assert_abs_diff_eq!(lat, lat2, epsilon = ANGLE_TOL);
                    assert_abs_diff_eq!(lon, lon2, epsilon = ANGLE_TOL);
                    assert_abs_diff_eq!(h, h2, epsilon = HEIGHT_TOL);
                }
            }
        }
    }

    #[test]
    fn test_antimeridian_longitude_round_trip() {
        let (x, y, z) = geodetic_to_ecef(10.0, 180.0, 0.0);
        let (_, lon, _) = ecef_to_geodetic(x, y, z);
        assert_abs_diff_eq!(lon.abs(), 180.0, epsilon = ANGLE_TOL);

        let (x, y, z) = geodetic_to_ecef(10.0, -179.999999, 0.0);
        let (_, lon, _) = ecef_to_geodetic(x, y, z);
        assert!(lon < 0.0);
        assert_abs_diff_eq!(lon, -179.999999, epsilon = ANGLE_TOL);
    }

    #[test]
    fn test_western_southern_quadrant_signs() {
        // Sao Paulo area: south and west of the origin
        let (x, y, z) = geodetic_to_ecef(-23.55, -46.63, 760.0);
        assert!(x > 0.0);
        assert!(y < 0.0);
        assert!(z < 0.0);
        let (lat, lon, h) = ecef_to_geodetic(x, y, z);
        assert_abs_diff_eq!(lat, -23.55, epsilon = ANGLE_TOL);
        assert_abs_diff_eq!(lon, -46.63, epsilon = ANGLE_TOL);
        assert_abs_diff_eq!(h, 760.0, epsilon = HEIGHT_TOL);
    }

    #[test]
    fn test_polar_axis_latitude_contract() {
        // on the polar axis the parametric latitude is undefined and the
        // inverse reports latitude 0
        let (lat, lon, _) = ecef_to_geodetic(0.0, 0.0, 6356752.3142);
        assert_eq!(lat, 0.0);
        assert_eq!(lon, 0.0);
    }

    #[test]
    fn test_enu_origin_at_reference_point() {
        let (lat0, lon0, h0) = (47.4979, 19.0402, 120.0);
        let (x, y, z) = geodetic_to_ecef(lat0, lon0, h0);
        let (e, n, u) = ecef_to_enu(x, y, z, lat0, lon0, h0);
        assert_abs_diff_eq!(e, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(n, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(u, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_enu_axis_directions() {
        let (lat0, lon0, h0) = (47.0, 19.0, 0.0);

        // a point slightly north should land on the +north axis
        let (e, n, _) = geodetic_to_enu(47.001, lon0, h0, lat0, lon0, h0);
        assert!(n > 100.0);
        assert_abs_diff_eq!(e, 0.0, epsilon = 1e-6);

        // a point slightly east should land on the +east axis
        let (e, n, _) = geodetic_to_enu(lat0, 19.001, h0, lat0, lon0, h0);
        assert!(e > 70.0);
        assert_abs_diff_eq!(n, 0.0, epsilon = 0.1);

        // a point straight up keeps east/north near zero
        let (e, n, u) = geodetic_to_enu(lat0, lon0, 50.0, lat0, lon0, h0);
        assert_abs_diff_eq!(e, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(n, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(u, 50.0, epsilon = 1e-3);
    }

    #[test]
    fn test_enu_round_trip() {
        let (lat0, lon0, h0) = (48.2082, 16.3738, 171.0);
        let (east, north, up) = (1250.0, -340.0, 12.5);

        let (x, y, z) = enu_to_ecef(east, north, up, lat0, lon0, h0);
        let (e2, n2, u2) = ecef_to_enu(x, y, z, lat0, lon0, h0);
        assert_abs_diff_eq!(east, e2, epsilon = 1e-6);
        assert_abs_diff_eq!(north, n2, epsilon = 1e-6);
        assert_abs_diff_eq!(up, u2, epsilon = 1e-6);

        let (lat, lon, h) = enu_to_geodetic(east, north, up, lat0, lon0, h0);
        let (e3, n3, u3) = geodetic_to_enu(lat, lon, h, lat0, lon0, h0);
        assert_abs_diff_eq!(east, e3, epsilon = 1e-3);
        assert_abs_diff_eq!(north, n3, epsilon = 1e-3);
        assert_abs_diff_eq!(up, u3, epsilon = 1e-3);
    }
}
