pub mod fingerprint;
pub mod overrides;

use egui::{Pos2, Vec2};

/// Round each axis to the nearest multiple of `grid_size`
pub fn snap_to_grid(pos: Pos2, grid_size: f32) -> Pos2 {
    if grid_size <= 0.0 {
        return pos;
    }
    Pos2::new(
        (pos.x / grid_size).round() * grid_size,
        (pos.y / grid_size).round() * grid_size,
    )
}

/// Centroid of `points` with each axis rounded to an integer; `None` for no points
pub fn rounded_centroid(points: impl IntoIterator<Item = Pos2>) -> Option<Pos2> {
    let (sum, count) = points
        .into_iter()
        .fold((Vec2::ZERO, 0usize), |(sum, count), p| (sum + p.to_vec2(), count + 1));
    if count == 0 {
        return None;
    }
    let mean = sum / count as f32;
    Some(Pos2::new(mean.x.round(), mean.y.round()))
}

/// Distance from a point to a line segment
pub fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq == 0.0 {
        return point.distance(start);
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

/// Index of the segment of `path` (between `path[i]` and `path[i + 1]`) closest to `point`.
///
/// Ties go to the earlier segment. `None` if the path has fewer than two points.
pub fn closest_segment(path: &[Pos2], point: Pos2) -> Option<usize> {
    path.windows(2)
        .enumerate()
        .map(|(index, pair)| (index, distance_to_segment(point, pair[0], pair[1])))
        .fold(None, |best: Option<(usize, f32)>, (index, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((index, distance)),
        })
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn snapping_rounds_to_nearest_multiple() {
        assert_eq!(snap_to_grid(pos2(29.0, 31.0), 20.0), pos2(20.0, 40.0));
        assert_eq!(snap_to_grid(pos2(-11.0, 9.0), 20.0), pos2(-20.0, 0.0));
        assert_eq!(snap_to_grid(pos2(7.5, 3.0), 0.0), pos2(7.5, 3.0));
    }

    #[test]
    fn centroid_is_rounded() {
        let c = rounded_centroid([pos2(0.0, 0.0), pos2(3.0, 1.0)]).unwrap();
        assert_eq!(c, pos2(2.0, 1.0));
        assert!(rounded_centroid(Vec::new()).is_none());
    }

    #[test]
    fn closest_segment_picks_nearest() {
        let path = [pos2(0.0, 0.0), pos2(100.0, 0.0), pos2(100.0, 100.0)];
        assert_eq!(closest_segment(&path, pos2(50.0, 5.0)), Some(0));
        assert_eq!(closest_segment(&path, pos2(95.0, 60.0)), Some(1));
        assert_eq!(closest_segment(&path[..1], pos2(0.0, 0.0)), None);
    }
}
