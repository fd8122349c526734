//! Geographic coordinate and bounding-box types.
//!
//! Coordinates are `f64` decimal degrees.  At the deepest tile level a
//! Berkeley-sized root is split into tiles under a thousandth of a degree
//! wide, so single precision is not enough for exact quadrant arithmetic.
//!
//! Longitude is the x-axis and latitude the y-axis throughout.

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` if both components are finite and within the WGS-84 range.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Squared Euclidean distance in degree space.
    #[inline]
    pub fn euclidean_deg_2(self, other: GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat * dlat + dlon * dlon
    }

    /// Euclidean distance in degree space.
    ///
    /// This is the routing metric: edge costs and the A* heuristic both use
    /// it, which keeps the heuristic consistent.
    #[inline]
    pub fn euclidean_deg(self, other: GeoPoint) -> f64 {
        self.euclidean_deg_2(other).sqrt()
    }

    /// Haversine great-circle distance in metres.  Used for reporting route
    /// length only, never as a search cost.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// Axis-aligned box given by its upper-left and lower-right corners.
///
/// A well-formed box has `ul_lon < lr_lon` and `ul_lat > lr_lat`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub ul_lon: f64,
    pub ul_lat: f64,
    pub lr_lon: f64,
    pub lr_lat: f64,
}

impl BoundingBox {
    #[inline]
    pub fn new(ul_lon: f64, ul_lat: f64, lr_lon: f64, lr_lat: f64) -> Self {
        Self { ul_lon, ul_lat, lr_lon, lr_lat }
    }

    /// Longitudinal span in degrees.  Non-positive for a degenerate box.
    #[inline]
    pub fn width(&self) -> f64 {
        self.lr_lon - self.ul_lon
    }

    /// Latitudinal span in degrees.  Non-positive for a degenerate box.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ul_lat - self.lr_lat
    }

    pub fn is_finite(&self) -> bool {
        self.ul_lon.is_finite()
            && self.ul_lat.is_finite()
            && self.lr_lon.is_finite()
            && self.lr_lat.is_finite()
    }

    /// Split point used for quartering: `(mid_lon, mid_lat)`.
    #[inline]
    pub fn midpoint(&self) -> (f64, f64) {
        (
            (self.ul_lon + self.lr_lon) / 2.0,
            (self.ul_lat + self.lr_lat) / 2.0,
        )
    }

    /// Standard axis-aligned overlap test.
    ///
    /// Boxes are rejected only when one lies strictly beyond the other on
    /// either axis, so boxes that share an edge still intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        if self.ul_lat < other.lr_lat || other.ul_lat < self.lr_lat {
            return false;
        }
        if self.ul_lon > other.lr_lon || other.ul_lon > self.lr_lon {
            return false;
        }
        true
    }

    /// `true` if `p` lies inside or on the boundary of the box.
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.ul_lon..=self.lr_lon).contains(&p.lon)
            && (self.lr_lat..=self.ul_lat).contains(&p.lat)
    }
}
