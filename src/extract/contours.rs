//! Outer contour tracing over an edge raster.

use geo::{Contains, Coord, LineString, Point, Polygon};

use super::edges::EdgeMap;

/// Neighbour offsets in clockwise order (image y axis points down), starting east.
const NEIGHBOURS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const WEST: usize = 4;

/// A closed pixel boundary, first point not repeated.
pub type Contour = Vec<(i64, i64)>;

/// Labels every pixel of the 8-connected component containing `start`.
fn flood(edges: &EdgeMap, start: (i64, i64), seen: &mut [bool]) {
    let width = edges.width() as i64;
    let mut stack = vec![start];
    seen[(start.1 * width + start.0) as usize] = true;
    while let Some((x, y)) = stack.pop() {
        for (dx, dy) in NEIGHBOURS {
            let (nx, ny) = (x + dx, y + dy);
            if edges.get(nx, ny) && !seen[(ny * width + nx) as usize] {
                seen[(ny * width + nx) as usize] = true;
                stack.push((nx, ny));
            }
        }
    }
}

/// First neighbour of `at` that is an edge pixel, searching clockwise from `from`.
fn next_neighbour(edges: &EdgeMap, at: (i64, i64), from: usize) -> Option<usize> {
    (0..8)
        .map(|i| (from + i) % 8)
        .find(|d| edges.get(at.0 + NEIGHBOURS[*d].0, at.1 + NEIGHBOURS[*d].1))
}

/// Moore-neighbour trace of the outer boundary of the component whose first
/// pixel in raster order is `start`.
fn trace(edges: &EdgeMap, start: (i64, i64)) -> Contour {
    let mut contour = vec![start];
    // the west neighbour of the first pixel in raster order is background
    let Some(first_dir) = next_neighbour(edges, start, WEST) else {
        return contour;
    };

    let limit = 4 * edges.width() * edges.height() + 8;
    let (mut at, mut dir) = (start, first_dir);
    for _ in 0..limit {
        at = (at.0 + NEIGHBOURS[dir].0, at.1 + NEIGHBOURS[dir].1);
        // resume the search at the last background pixel examined
        let resume = (dir + 6 - dir % 2) % 8;
        let Some(next) = next_neighbour(edges, at, resume) else {
            break;
        };
        if at == start && next == first_dir {
            break;
        }
        contour.push(at);
        dir = next;
    }
    contour
}

/// Drops points lying on a straight run between their neighbours.
pub fn compress(contour: &[(i64, i64)]) -> Contour {
    let n = contour.len();
    if n < 3 {
        return contour.to_vec();
    }
    (0..n)
        .filter(|&i| {
            let (px, py) = contour[(i + n - 1) % n];
            let (cx, cy) = contour[i];
            let (nx, ny) = contour[(i + 1) % n];
            (cx - px, cy - py) != (nx - cx, ny - cy)
        })
        .map(|i| contour[i])
        .collect()
}

fn to_polygon(contour: &[(i64, i64)]) -> Polygon {
    let ring: Vec<Coord> = contour
        .iter()
        .map(|(x, y)| Coord {
            x: *x as f64,
            y: *y as f64,
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// Outer contours of all edge components, in raster order of their first pixel.
///
/// Contours lying strictly inside another contour are discarded, so only
/// outermost boundaries remain. Returned contours are compressed to their
/// direction changes.
pub fn external_contours(edges: &EdgeMap) -> Vec<Contour> {
    let (w, h) = (edges.width() as i64, edges.height() as i64);
    let mut seen = vec![false; (w * h) as usize];
    let mut contours = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if edges.get(x, y) && !seen[(y * w + x) as usize] {
                flood(edges, (x, y), &mut seen);
                contours.push(compress(&trace(edges, (x, y))));
            }
        }
    }

    let outlines: Vec<Option<Polygon>> = contours
        .iter()
        .map(|c| (c.len() >= 3).then(|| to_polygon(c)))
        .collect();

    contours
        .iter()
        .enumerate()
        .filter(|(i, contour)| {
            let (x, y) = contour[0];
            let start = Point::new(x as f64, y as f64);
            !outlines.iter().enumerate().any(|(j, outline)| {
                j != *i && outline.as_ref().is_some_and(|p| p.contains(&start))
            })
        })
        .map(|(_, contour)| contour.clone())
        .collect()
}
