//! Typed request parameters.
//!
//! Transports hand the service a flat `name → value` string map (an HTTP
//! query string, a CLI argument list).  The `from_params` constructors are
//! the only place those strings are parsed.
//!
//! | Request          | Parameters                                  |
//! |------------------|---------------------------------------------|
//! | [`RasterRequest`]| `ullon`, `ullat`, `lrlon`, `lrlat`, `w`, `h`|
//! | [`RouteRequest`] | `start_lat`, `start_lon`, `end_lat`, `end_lon` |

use std::collections::HashMap;

use bm_core::{BoundingBox, GeoPoint};

use crate::{ServiceError, ServiceResult};

/// Raw request parameters as received from a transport.
pub type Params = HashMap<String, String>;

// ── RasterRequest ─────────────────────────────────────────────────────────────

/// A raster query: the box the user is looking at and the size of their
/// viewport in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterRequest {
    pub bbox: BoundingBox,
    pub width_px: u32,
    pub height_px: u32,
}

impl RasterRequest {
    pub fn new(bbox: BoundingBox, width_px: u32, height_px: u32) -> Self {
        Self { bbox, width_px, height_px }
    }

    /// Parse `ullon`, `ullat`, `lrlon`, `lrlat`, `w` and `h`.
    ///
    /// Latitudes must lie in `[-90, 90]` and longitudes in `[-180, 180]`.
    /// The box itself is not checked here; an inverted box is a tile-query
    /// error.  `w` and `h` are rounded to the
    /// nearest whole pixel and must come out at least 1.
    ///
    /// # Errors
    ///
    /// [`ServiceError::MissingParam`] or [`ServiceError::InvalidParam`].
    pub fn from_params(params: &Params) -> ServiceResult<Self> {
        let bbox = BoundingBox::new(
            longitude(params, "ullon")?,
            latitude(params, "ullat")?,
            longitude(params, "lrlon")?,
            latitude(params, "lrlat")?,
        );
        Ok(Self::new(bbox, pixels(params, "w")?, pixels(params, "h")?))
    }
}

// ── RouteRequest ──────────────────────────────────────────────────────────────

/// A route query between two arbitrary points.  Each end is snapped to its
/// nearest intersection before searching.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

impl RouteRequest {
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self { start, end }
    }

    /// Parse `start_lat`, `start_lon`, `end_lat` and `end_lon`, with the same
    /// coordinate ranges as [`RasterRequest::from_params`].
    ///
    /// # Errors
    ///
    /// [`ServiceError::MissingParam`] or [`ServiceError::InvalidParam`].
    pub fn from_params(params: &Params) -> ServiceResult<Self> {
        let start = GeoPoint::new(latitude(params, "start_lat")?, longitude(params, "start_lon")?);
        let end = GeoPoint::new(latitude(params, "end_lat")?, longitude(params, "end_lon")?);
        Ok(Self::new(start, end))
    }
}

// ── Parsing helpers ───────────────────────────────────────────────────────────

fn raw<'a>(params: &'a Params, name: &'static str) -> ServiceResult<&'a str> {
    params.get(name).map(String::as_str).ok_or(ServiceError::MissingParam(name))
}

fn invalid(name: &'static str, value: &str) -> ServiceError {
    ServiceError::InvalidParam { name, value: value.to_owned() }
}

/// A required finite `f64`.
fn number(params: &Params, name: &'static str) -> ServiceResult<f64> {
    let value = raw(params, name)?;
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(name, value)),
    }
}

/// A required `f64` within `[-limit, limit]`.
fn bounded(params: &Params, name: &'static str, limit: f64) -> ServiceResult<f64> {
    let v = number(params, name)?;
    if v.abs() > limit {
        return Err(invalid(name, raw(params, name)?));
    }
    Ok(v)
}

fn latitude(params: &Params, name: &'static str) -> ServiceResult<f64> {
    bounded(params, name, 90.0)
}

fn longitude(params: &Params, name: &'static str) -> ServiceResult<f64> {
    bounded(params, name, 180.0)
}

/// A required pixel count: a finite number rounded to `1..=u32::MAX`.
fn pixels(params: &Params, name: &'static str) -> ServiceResult<u32> {
    let value = raw(params, name)?;
    let px = number(params, name)?.round();
    if px < 1.0 || px > u32::MAX as f64 {
        return Err(invalid(name, value));
    }
    Ok(px as u32)
}
