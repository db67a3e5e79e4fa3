use std::f64::consts::PI;

/// Celestial coordinate, decimal degrees.
/// `ra` is in [0, 360), `dec` in [-90, 90].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SkyCoord {
    pub ra:  f64,
    pub dec: f64,
}

/// RA/DEC rotated into the mount's axes frame. Not a physical
/// azimuth/altitude, only a rotated projection used for differencing,
/// so values may leave the usual RA/DEC ranges.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MountCoord {
    pub az:  f64,
    pub alt: f64,
}

pub struct RotMatrix {
    sin: f64,
    cos: f64,
}

impl RotMatrix {
    pub fn new(angle: f64) -> Self {
        Self {
            sin: f64::sin(angle),
            cos: f64::cos(angle),
        }
    }

    pub fn rotate(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.cos + y * self.sin,
         y * self.cos - x * self.sin)
    }

    pub fn to_mount(&self, crd: &SkyCoord) -> MountCoord {
        let (az, alt) = self.rotate(crd.ra, crd.dec);
        MountCoord { az, alt }
    }
}

pub fn radian_to_degree(radian: f64) -> f64 {
    180.0 * radian / PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rotation_is_identity() {
        let rot = RotMatrix::new(0.0);
        for (x, y) in [(0.0, 0.0), (1.0, 2.0), (-3.5, 0.25), (359.9, -89.9)] {
            let (az, alt) = rot.rotate(x, y);
            assert!(az == x);
            assert!(alt == y);
        }
    }

    #[test]
    fn test_quarter_turn() {
        // rotating by pi/2 maps (x, y) into (y, -x)
        let rot = RotMatrix::new(PI / 2.0);
        let (az, alt) = rot.rotate(3.0, 7.0);
        assert!(f64::abs(az - 7.0) < 1e-12);
        assert!(f64::abs(alt + 3.0) < 1e-12);
    }

    #[test]
    fn test_to_mount() {
        let rot = RotMatrix::new(0.0);
        let crd = SkyCoord { ra: 56.85, dec: 24.1 };
        let mount = rot.to_mount(&crd);
        assert!(mount.az == crd.ra);
        assert!(mount.alt == crd.dec);
    }

    #[test]
    fn test_angle_units() {
        assert!(f64::abs(radian_to_degree(PI) - 180.0) < 1e-12);
        assert!(f64::abs(radian_to_degree(PI / 2.0) - 90.0) < 1e-12);
    }
}
