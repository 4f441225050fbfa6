//! Math utilities and helpers.

use glam::Vec3;

/// Directed line segment between two continuous positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Segment start
    pub start: Vec3,
    /// Segment end
    pub end: Vec3,
}

impl Segment {
    /// Create a new segment
    #[inline]
    pub const fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Vector from start to end
    #[inline]
    pub fn delta(&self) -> Vec3 {
        self.end - self.start
    }

    /// Get the point at parameter t (0 = start, 1 = end)
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.start + self.delta() * t
    }

    /// Whether both endpoints are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }
}

/// Axis-Aligned Bounding Box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB of the given size centred on `centre`
    #[inline]
    pub fn from_centre_extent(centre: Vec3, extent: Vec3) -> Self {
        let half = extent * 0.5;
        Self {
            min: centre - half,
            max: centre + half,
        }
    }

    /// Create an AABB for a unit cube at the given position
    #[inline]
    pub fn unit_cube(pos: Vec3) -> Self {
        Self {
            min: pos,
            max: pos + Vec3::ONE,
        }
    }

    /// Get the center of the AABB
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the AABB
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if a point is inside the AABB
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Clip a segment against the box.
    ///
    /// Returns the parameter range `(t_enter, t_exit)` within `[0, 1]` of the
    /// part of the segment inside the box, or `None` if the segment misses it.
    /// Faces count as inside, so a segment grazing a face yields
    /// `t_enter == t_exit`.
    pub fn clip_segment(&self, segment: &Segment) -> Option<(f32, f32)> {
        let delta = segment.delta();
        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;

        for axis in 0..3 {
            let origin = segment.start[axis];
            let d = delta[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d == 0.0 {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t1 = (lo - origin) * inv;
            let mut t2 = (hi - origin) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_enter = t_enter.max(t1);
            t_exit = t_exit.min(t2);
            if t_enter > t_exit {
                return None;
            }
        }

        Some((t_enter, t_exit))
    }
}
