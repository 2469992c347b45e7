//! Ramer-Douglas-Peucker simplification of closed pixel contours.

use geo::Coord;

/// Perpendicular distance from `point` to the segment `start`-`end`.
///
/// Falls back to the distance to `start` when the segment is degenerate, which
/// happens when a closed ring is split at its own starting point.
fn point_to_segment_distance(point: Coord, start: Coord, end: Coord) -> f64 {
    let seg = end - start;
    let rel = point - start;
    let len_sq = seg.x * seg.x + seg.y * seg.y;
    if len_sq < f64::EPSILON {
        return rel.x.hypot(rel.y);
    }

    let t = ((rel.x * seg.x + rel.y * seg.y) / len_sq).clamp(0.0, 1.0);
    let closest = start + seg * t;
    let diff = point - closest;
    diff.x.hypot(diff.y)
}

/// Indices of the points kept when simplifying an open polyline.
pub fn simplify_indices(points: &[Coord], epsilon: f64) -> Vec<usize> {
    if points.len() <= 2 {
        return (0..points.len()).collect();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    rdp_recursive(points, 0, points.len() - 1, epsilon, &mut keep);

    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| if k { Some(i) } else { None })
        .collect()
}

fn rdp_recursive(points: &[Coord], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_distance = 0.0;
    let mut max_index = start;
    for (offset, point) in points[start + 1..end].iter().enumerate() {
        let distance = point_to_segment_distance(*point, points[start], points[end]);
        if distance > max_distance {
            max_distance = distance;
            max_index = start + 1 + offset;
        }
    }

    if max_distance > epsilon {
        keep[max_index] = true;
        rdp_recursive(points, start, max_index, epsilon, keep);
        rdp_recursive(points, max_index, end, epsilon, keep);
    }
}

/// Length of the closed ring through `points`, including the closing segment.
pub fn perimeter(points: &[Coord]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| (*b - *a).x.hypot((*b - *a).y))
        .sum()
}

/// Simplifies a closed ring (first point not repeated at the end).
pub fn simplify_ring(points: &[Coord], epsilon: f64) -> Vec<Coord> {
    if points.len() <= 3 {
        return points.to_vec();
    }
    let mut ring = points.to_vec();
    ring.push(points[0]);

    let mut kept: Vec<Coord> = simplify_indices(&ring, epsilon)
        .into_iter()
        .map(|i| ring[i])
        .collect();
    kept.pop();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord {
        Coord { x, y }
    }

    #[test]
    fn test_straight_line_collapses() {
        let points: Vec<Coord> = (0..10).map(|i| c(i as f64, 0.0)).collect();
        assert_eq!(simplify_indices(&points, 0.5), vec![0, 9]);
    }

    #[test]
    fn test_corner_is_preserved() {
        let points = vec![
            c(0.0, 0.0),
            c(5.0, 0.0),
            c(10.0, 0.0),
            c(10.0, 5.0),
            c(10.0, 10.0),
        ];
        assert_eq!(simplify_indices(&points, 0.5), vec![0, 2, 4]);
    }

    #[test]
    fn test_small_inputs_untouched() {
        assert!(simplify_indices(&[], 1.0).is_empty());
        assert_eq!(simplify_indices(&[c(1.0, 1.0)], 1.0), vec![0]);
        assert_eq!(
            simplify_indices(&[c(0.0, 0.0), c(1.0, 1.0)], 1.0),
            vec![0, 1]
        );
    }

    #[test]
    fn test_perimeter_closes_ring() {
        let square = vec![c(0.0, 0.0), c(4.0, 0.0), c(4.0, 4.0), c(0.0, 4.0)];
        assert_eq!(perimeter(&square), 16.0);
    }

    #[test]
    fn test_simplify_ring_keeps_square_corners() {
        let mut ring = Vec::new();
        for x in 0..4 {
            ring.push(c(x as f64, 0.0));
        }
        for y in 0..4 {
            ring.push(c(4.0, y as f64));
        }
        for x in (1..=4).rev() {
            ring.push(c(x as f64, 4.0));
        }
        for y in (1..=4).rev() {
            ring.push(c(0.0, y as f64));
        }
        let simplified = simplify_ring(&ring, 0.16);
        assert_eq!(
            simplified,
            vec![c(0.0, 0.0), c(4.0, 0.0), c(4.0, 4.0), c(0.0, 4.0)]
        );
    }
}
