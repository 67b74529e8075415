// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Contour geometry helpers
//!
//! Contours coming out of border following are closed curves, so both the
//! perimeter and the polygon approximation treat the last point as connected
//! back to the first one.

use imageproc::point::Point;

use super::Rectangle;

/// Perimeter of a closed curve
pub fn arc_length(points: &[Point<u32>]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }

    (0..n)
        .map(|i| distance(&points[i], &points[(i + 1) % n]))
        .sum()
}

/// Approximate a closed curve with a polygon (Douglas-Peucker)
///
/// The curve is split at its first point and the point farthest from it,
/// then each half is simplified independently so that the closing segment
/// does not introduce a spurious vertex. Returned vertices are a subset of
/// the input points, in curve order.
pub fn approximate_polygon(points: &[Point<u32>], epsilon: f64) -> Vec<Point<u32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let (split, split_dist) = points
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, p)| (i, distance(&points[0], p)))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });

    if split_dist == 0.0 {
        return vec![points[0]];
    }

    let first_half = &points[..=split];
    let mut second_half: Vec<Point<u32>> = points[split..].to_vec();
    second_half.push(points[0]);

    let mut polygon = douglas_peucker(first_half, epsilon);
    let closing = douglas_peucker(&second_half, epsilon);

    // Drop the shared split point and the repeated start point
    polygon.extend_from_slice(&closing[1..closing.len() - 1]);
    polygon
}

/// Smallest upright rectangle containing every point (pixel-inclusive)
pub fn bounding_rect(points: &[Point<u32>]) -> Option<Rectangle> {
    let first = points.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);

    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    Some(Rectangle::new(
        min_x,
        min_y,
        max_x - min_x + 1,
        max_y - min_y + 1,
    ))
}

/// Open-curve Douglas-Peucker; keeps both endpoints
fn douglas_peucker(points: &[Point<u32>], epsilon: f64) -> Vec<Point<u32>> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0, last)];
    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_index = start;
        for i in (start + 1)..end {
            let dist = point_to_line_distance(&points[i], &points[start], &points[end]);
            if dist > max_dist {
                max_dist = dist;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((max_index, end));
            stack.push((start, max_index));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn distance(a: &Point<u32>, b: &Point<u32>) -> f64 {
    let dx = a.x as f64 - b.x as f64;
    let dy = a.y as f64 - b.y as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Perpendicular distance from `point` to the line through `start` and `end`
fn point_to_line_distance(point: &Point<u32>, start: &Point<u32>, end: &Point<u32>) -> f64 {
    let (px, py) = (point.x as f64, point.y as f64);
    let (sx, sy) = (start.x as f64, start.y as f64);
    let (ex, ey) = (end.x as f64, end.y as f64);

    let a = ey - sy;
    let b = sx - ex;
    let denominator = (a * a + b * b).sqrt();
    if denominator == 0.0 {
        return distance(point, start);
    }

    let c = ex * sy - sx * ey;
    (a * px + b * py + c).abs() / denominator
}
