#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Municipal boundary polygon and point-in-polygon checks.
//!
//! The boundary `GeoJSON` is published in inconsistent shapes depending on
//! how it was exported (a `FeatureCollection`, a bare `Feature`, or a raw
//! geometry), so parsing accepts all three and extracts the first polygon
//! it finds. The boundary gates where a report may be placed on the map;
//! it is a UX affordance only, not a security boundary.

use geo::{Contains, MultiPolygon};
use geojson::GeoJson;

/// Errors raised while parsing a boundary document.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// The document is not valid `GeoJSON`.
    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    /// The document parsed but contained no polygon geometry.
    #[error("GeoJSON contains no polygon geometry")]
    NoPolygon,
}

/// A loaded boundary polygon.
#[derive(Debug, Clone)]
pub struct Boundary {
    polygon: MultiPolygon<f64>,
}

impl Boundary {
    /// Parses a boundary from a `GeoJSON` document.
    ///
    /// Accepts a `FeatureCollection` (the first feature's geometry is
    /// used), a single `Feature`, or a raw `Polygon`/`MultiPolygon`
    /// geometry.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] if the document is not valid `GeoJSON`
    /// or contains no polygon geometry.
    pub fn from_geojson(geojson_str: &str) -> Result<Self, BoundaryError> {
        let geojson: GeoJson = geojson_str.parse()?;

        let geometry = match geojson {
            GeoJson::FeatureCollection(fc) => fc
                .features
                .into_iter()
                .next()
                .and_then(|feature| feature.geometry),
            GeoJson::Feature(feature) => feature.geometry,
            GeoJson::Geometry(geometry) => Some(geometry),
        };

        let polygon = geometry
            .and_then(|geom| {
                let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
                match geo_geom {
                    geo::Geometry::MultiPolygon(mp) => Some(mp),
                    geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
                    _ => None,
                }
            })
            .ok_or(BoundaryError::NoPolygon)?;

        Ok(Self { polygon })
    }

    /// Whether the point lies inside the boundary polygon.
    #[must_use]
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        self.polygon.contains(&geo::Point::new(lng, lat))
    }
}

/// A boundary slot that is filled once per session.
///
/// Starts empty and answers `false` for every point until the `GeoJSON`
/// load completes (fail-closed: no reports can be placed before the
/// boundary is known).
#[derive(Debug, Clone, Default)]
pub struct BoundaryGate {
    boundary: Option<Boundary>,
}

impl BoundaryGate {
    /// Creates an empty gate.
    #[must_use]
    pub const fn new() -> Self {
        Self { boundary: None }
    }

    /// Installs a parsed boundary document.
    ///
    /// A parse failure leaves the gate closed and is logged rather than
    /// propagated: the map stays usable, reporting just stays disabled.
    pub fn install(&mut self, geojson_str: &str) {
        match Boundary::from_geojson(geojson_str) {
            Ok(boundary) => {
                self.boundary = Some(boundary);
                log::info!("Boundary loaded");
            },
            Err(e) => {
                log::error!("Failed to load boundary: {e}");
            },
        }
    }

    /// Whether the boundary has been loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.boundary.is_some()
    }

    /// Whether the point is inside the boundary. `false` until loaded.
    #[must_use]
    pub fn is_inside(&self, lng: f64, lat: f64) -> bool {
        self.boundary
            .as_ref()
            .is_some_and(|b| b.contains(lng, lat))
    }
}
