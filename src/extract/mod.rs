//! Approximate district polygons traced from a raster map image.
//!
//! This is a rough, best-effort pipeline: edges are detected on the grayscale
//! image, the outer contour of each edge component is simplified to a polygon,
//! and pixel positions are mapped linearly into a fixed lat/lon box. There are
//! no accuracy guarantees.

pub mod contours;
pub mod edges;
pub mod simplify;

use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, LineString, Polygon};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use image::GrayImage;
use tracing::{debug, info};

use contours::external_contours;
use edges::{HIGH_THRESHOLD, LOW_THRESHOLD, canny};
use simplify::{perimeter, simplify_ring};

/// Fraction of a contour's perimeter used as the simplification tolerance.
pub const SIMPLIFY_RATIO: f64 = 0.01;

/// Geographic box the image is stretched over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox {
            lat_min: 0.045,
            lat_max: 0.193,
            lon_min: -119.97,
            lon_max: -119.727,
        }
    }
}

impl BoundingBox {
    /// Maps pixel `(x, y)` of a `width` x `height` image to `(lon, lat)`.
    /// Row 0 is the northern edge.
    pub fn pixel_to_coord(&self, x: f64, y: f64, width: u32, height: u32) -> Coord {
        Coord {
            x: self.lon_min + x / f64::from(width) * (self.lon_max - self.lon_min),
            y: self.lat_max - y / f64::from(height) * (self.lat_max - self.lat_min),
        }
    }
}

/// Opens a PNG or JPEG map image and converts it to 8-bit grayscale.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_grayscale(path: &Path) -> Result<GrayImage> {
    let image = image::open(path)
        .with_context(|| format!("reading map image {}", path.display()))?
        .to_luma8();
    info!(
        width = image.width(),
        height = image.height(),
        "Map image loaded"
    );
    Ok(image)
}

/// Builds the feature for contour number `index`, or `None` when the
/// simplified outline has fewer than three corners.
fn contour_feature(
    index: usize,
    contour: &[(i64, i64)],
    (width, height): (u32, u32),
    bbox: &BoundingBox,
) -> Option<Feature> {
    let pixels: Vec<Coord> = contour
        .iter()
        .map(|(x, y)| Coord {
            x: *x as f64,
            y: *y as f64,
        })
        .collect();
    let outline = simplify_ring(&pixels, SIMPLIFY_RATIO * perimeter(&pixels));
    if outline.len() < 3 {
        return None;
    }

    let ring: Vec<Coord> = outline
        .iter()
        .map(|p| bbox.pixel_to_coord(p.x, p.y, width, height))
        .collect();
    // LineString closes itself when used as a polygon exterior
    let polygon = Polygon::new(LineString::from(ring), vec![]);

    let id = index as u64 + 1;
    let mut properties = JsonObject::new();
    let name = format!("District {id}");
    properties.insert("name".to_string(), JsonValue::from(name));
    properties.insert("shake_intensity".to_string(), JsonValue::Null);

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&polygon))),
        id: Some(Id::Number(id.into())),
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Traces approximate district polygons out of `image`.
///
/// Features are numbered by contour, starting at 1, so IDs of contours too
/// small to form a polygon are skipped.
#[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn extract_boundaries(image: &GrayImage, bbox: &BoundingBox) -> FeatureCollection {
    let edges = canny(image, LOW_THRESHOLD, HIGH_THRESHOLD);
    debug!(edge_pixels = edges.count(), "Edges detected");

    let contours = external_contours(&edges);
    let size = (image.width(), image.height());
    let features: Vec<Feature> = contours
        .iter()
        .enumerate()
        .filter_map(|(i, contour)| contour_feature(i, contour, size, bbox))
        .collect();
    info!(
        contours = contours.len(),
        polygons = features.len(),
        "Boundaries extracted"
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use serde_json::json;

    fn exterior(feature: &Feature) -> Vec<Vec<f64>> {
        match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Polygon(rings)) => rings[0].clone(),
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_pixel_to_coord_corners() {
        let bbox = BoundingBox::default();
        let top_left = bbox.pixel_to_coord(0.0, 0.0, 100, 50);
        assert_eq!(
            top_left,
            Coord {
                x: -119.97,
                y: 0.193
            }
        );

        let bottom_right = bbox.pixel_to_coord(100.0, 50.0, 100, 50);
        assert!((bottom_right.x - -119.727).abs() < 1e-12);
        assert!((bottom_right.y - 0.045).abs() < 1e-12);
    }

    #[test]
    fn test_contour_feature_properties() {
        let bbox = BoundingBox {
            lat_min: 0.0,
            lat_max: 10.0,
            lon_min: 0.0,
            lon_max: 10.0,
        };
        let square = vec![(2, 2), (6, 2), (6, 6), (2, 6)];
        let feature = contour_feature(4, &square, (10, 10), &bbox).unwrap();

        assert_eq!(feature.id, Some(Id::Number(5.into())));
        assert_eq!(feature.property("name"), Some(&json!("District 5")));
        assert_eq!(feature.property("shake_intensity"), Some(&JsonValue::Null));
        assert_eq!(
            exterior(&feature),
            vec![
                vec![2.0, 8.0],
                vec![6.0, 8.0],
                vec![6.0, 4.0],
                vec![2.0, 4.0],
                vec![2.0, 8.0],
            ]
        );
    }

    #[test]
    fn test_degenerate_contour_skipped() {
        let bbox = BoundingBox::default();
        assert!(contour_feature(0, &[(3, 3)], (10, 10), &bbox).is_none());
        let segment = [(1, 1), (5, 1)];
        assert!(contour_feature(0, &segment, (10, 10), &bbox).is_none());
    }

    #[test]
    fn test_blank_image_has_no_boundaries() {
        let image = GrayImage::from_pixel(20, 20, Luma([200]));
        let fc = extract_boundaries(&image, &BoundingBox::default());
        assert!(fc.features.is_empty());
    }

    #[test]
    fn test_rectangle_yields_closed_polygon_in_box() {
        let image = GrayImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let bbox = BoundingBox::default();
        let fc = extract_boundaries(&image, &bbox);
        assert!(!fc.features.is_empty());

        for feature in &fc.features {
            let ring = exterior(feature);
            assert!(ring.len() >= 4);
            assert_eq!(ring.first(), ring.last());
            for point in &ring {
                assert!(point[0] >= bbox.lon_min && point[0] <= bbox.lon_max);
                assert!(point[1] >= bbox.lat_min && point[1] <= bbox.lat_max);
            }
        }
    }
}
