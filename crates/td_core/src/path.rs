//! The enemy path: an immutable polyline with precomputed lengths.
//!
//! Enemies store a normalized progress in `[0, 1]` and ask the path for
//! their position. Tower placement asks the path whether a footprint
//! would sit on the road.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::{Fixed, Vec2Fixed};

/// How tower placement decides that a point is on the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PathBlockMode {
    /// Axis-aligned bounding box of each segment, grown by the tolerance.
    ///
    /// Cheap but coarse. Near diagonal segments the box
    /// covers far more ground than the road itself, so some valid spots
    /// are rejected.
    BoundingBox,
    /// True point-to-segment distance.
    #[default]
    Exact,
}

/// Designer-authored polyline enemies walk along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathModel {
    waypoints: Vec<Vec2Fixed>,
    /// Length of segment `i` (from waypoint `i` to `i + 1`).
    segment_lengths: Vec<Fixed>,
    /// Path length up to the end of segment `i`.
    cumulative: Vec<Fixed>,
    total_length: Fixed,
}

impl PathModel {
    /// Build a path from its waypoints.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::InvalidPath`] if fewer than two waypoints
    /// are given or the path has zero length.
    pub fn new(waypoints: Vec<Vec2Fixed>) -> Result<Self, ConfigError> {
        if waypoints.len() < 2 {
            return Err(ConfigError::InvalidPath(format!(
                "need at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }

        let segment_lengths: Vec<Fixed> = waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .collect();

        let mut running = Fixed::ZERO;
        let cumulative: Vec<Fixed> = segment_lengths
            .iter()
            .map(|&length| {
                running += length;
                running
            })
            .collect();

        if running <= Fixed::ZERO {
            return Err(ConfigError::InvalidPath(
                "waypoints enclose a path of zero length".to_string(),
            ));
        }

        Ok(Self {
            waypoints,
            segment_lengths,
            cumulative,
            total_length: running,
        })
    }

    /// Waypoints in walking order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2Fixed] {
        &self.waypoints
    }

    /// Total walking distance from the first to the last waypoint.
    #[must_use]
    pub fn total_length(&self) -> Fixed {
        self.total_length
    }

    /// Number of segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segment_lengths.len()
    }

    /// First waypoint; enemies spawn here.
    #[must_use]
    pub fn start(&self) -> Vec2Fixed {
        self.waypoints[0]
    }

    /// Last waypoint; reaching it leaks into the core.
    #[must_use]
    pub fn end(&self) -> Vec2Fixed {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// Position at normalized `progress`.
    ///
    /// Progress is clamped to `[0, 1]`; inside the range the point is
    /// interpolated within the segment whose cumulative length bracket
    /// contains `progress * total_length`.
    #[must_use]
    pub fn position_at(&self, progress: Fixed) -> Vec2Fixed {
        if progress <= Fixed::ZERO {
            return self.start();
        }
        if progress >= Fixed::ONE {
            return self.end();
        }

        let target = self.total_length * progress;
        let index = self
            .cumulative
            .partition_point(|&reached| reached < target)
            .min(self.segment_lengths.len() - 1);

        let length = self.segment_lengths[index];
        if length == Fixed::ZERO {
            return self.waypoints[index];
        }

        let segment_start = self.cumulative[index] - length;
        let t = ((target - segment_start) / length).clamp(Fixed::ZERO, Fixed::ONE);
        self.waypoints[index].lerp(self.waypoints[index + 1], t)
    }

    /// Bounding-box path test.
    ///
    /// True if `point` lies inside any segment's axis-aligned bounding box
    /// grown by `tolerance`. This over-approximates the road; see
    /// [`PathBlockMode::BoundingBox`].
    #[must_use]
    pub fn is_blocked(&self, point: Vec2Fixed, tolerance: Fixed) -> bool {
        self.waypoints.windows(2).any(|pair| {
            let (a, b) = (pair[0], pair[1]);
            let min_x = a.x.min(b.x) - tolerance;
            let max_x = a.x.max(b.x) + tolerance;
            let min_y = a.y.min(b.y) - tolerance;
            let max_y = a.y.max(b.y) + tolerance;
            point.x >= min_x && point.x <= max_x && point.y >= min_y && point.y <= max_y
        })
    }

    /// Exact shortest distance from `point` to the polyline.
    #[must_use]
    pub fn distance_to(&self, point: Vec2Fixed) -> Fixed {
        self.waypoints
            .windows(2)
            .map(|pair| distance_to_segment(point, pair[0], pair[1]))
            .min()
            .unwrap_or(Fixed::MAX)
    }

    /// Placement path test using the configured mode.
    #[must_use]
    pub fn blocks(&self, point: Vec2Fixed, tolerance: Fixed, mode: PathBlockMode) -> bool {
        match mode {
            PathBlockMode::BoundingBox => self.is_blocked(point, tolerance),
            PathBlockMode::Exact => self.distance_to(point) <= tolerance,
        }
    }
}

fn distance_to_segment(point: Vec2Fixed, a: Vec2Fixed, b: Vec2Fixed) -> Fixed {
    let ab = b - a;
    let length_sq = ab.dot(ab);
    if length_sq == Fixed::ZERO {
        return point.distance(a);
    }

    let t = ((point - a).dot(ab) / length_sq).clamp(Fixed::ZERO, Fixed::ONE);
    point.distance(a.lerp(b, t))
}
