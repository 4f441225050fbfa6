//! Tile rasterisation of line segments.
//!
//! [`TileWalk`] yields the tiles along a segment in order from start to end.
//! Two stepping policies are offered:
//!
//! - [`StepMode::Conservative`] is a 3D DDA (Amanatides & Woo) that always
//!   advances the axis whose next tile boundary is nearest. When the segment
//!   crosses an edge or corner exactly, every tile meeting there is yielded,
//!   so thin objects are never skipped.
//! - [`StepMode::Fast`] is a 3D Bresenham walk between the start and end
//!   tiles. It moves diagonally, so it yields fewer tiles and can miss tiles
//!   the segment clips. Only meant for debug visualisation.
//!
//! Walks are unbounded; callers clip the segment to their map first.

use std::collections::VecDeque;

use glam::{IVec3, Vec3};
use tessera_core::math::Segment;
use tessera_core::TilePos;

/// Boundary crossings closer than this (in segment parameter) are
/// treated as simultaneous.
const TIE_EPSILON: f32 = 1e-6;

/// How a segment is rasterised into tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StepMode {
    /// Visit every tile the segment touches.
    #[default]
    Conservative,
    /// Visit one tile per step along the dominant axis.
    Fast,
}

#[derive(Debug)]
struct Dda {
    current: IVec3,
    end: IVec3,
    step: IVec3,
    t_max: Vec3,
    t_delta: Vec3,
    pending: VecDeque<IVec3>,
    done: bool,
}

impl Dda {
    fn new(segment: &Segment) -> Self {
        let start = segment.start;
        let dir = segment.delta();
        let current = start.floor().as_ivec3();
        let end = segment.end.floor().as_ivec3();

        let mut step = IVec3::ZERO;
        let mut t_max = Vec3::INFINITY;
        let mut t_delta = Vec3::INFINITY;
        for axis in 0..3 {
            if dir[axis] > 0.0 {
                step[axis] = 1;
                t_delta[axis] = 1.0 / dir[axis];
                t_max[axis] = ((current[axis] as f32 + 1.0) - start[axis]) / dir[axis];
            } else if dir[axis] < 0.0 {
                step[axis] = -1;
                t_delta[axis] = -1.0 / dir[axis];
                t_max[axis] = (start[axis] - current[axis] as f32) / -dir[axis];
            }
            // Zero direction: the axis never advances.
        }

        let mut pending = VecDeque::with_capacity(8);
        pending.push_back(current);
        Self {
            current,
            end,
            step,
            t_max,
            t_delta,
            pending,
            done: false,
        }
    }

    /// Queue the tiles reached at the next boundary crossing.
    fn advance(&mut self) {
        if self.current == self.end {
            self.done = true;
            return;
        }
        let t_min = self.t_max.min_element();
        if t_min > 1.0 || !t_min.is_finite() {
            self.done = true;
            return;
        }

        let mut tied = [false; 3];
        for axis in 0..3 {
            tied[axis] = self.t_max[axis] - t_min <= TIE_EPSILON;
        }
        let axes: Vec<usize> = (0..3).filter(|&a| tied[a]).collect();

        // Every proper subset of the tied axes names a tile touching the
        // crossing point; yield them before the diagonal destination.
        let full = (1_u8 << axes.len()) - 1;
        let mut subsets: Vec<u8> = (1..full).collect();
        subsets.sort_by_key(|mask| mask.count_ones());
        for mask in subsets {
            let mut tile = self.current;
            for (bit, &axis) in axes.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    tile[axis] += self.step[axis];
                }
            }
            self.pending.push_back(tile);
        }

        for &axis in &axes {
            self.current[axis] += self.step[axis];
            self.t_max[axis] += self.t_delta[axis];
        }
        self.pending.push_back(self.current);
    }

    fn next(&mut self) -> Option<IVec3> {
        loop {
            if let Some(tile) = self.pending.pop_front() {
                return Some(tile);
            }
            if self.done {
                return None;
            }
            self.advance();
        }
    }
}

#[derive(Debug)]
struct Bresenham {
    current: IVec3,
    step: IVec3,
    delta: IVec3,
    error: IVec3,
    remaining: i32,
    steps: i32,
    started: bool,
}

impl Bresenham {
    fn new(segment: &Segment) -> Self {
        let current = segment.start.floor().as_ivec3();
        let end = segment.end.floor().as_ivec3();
        let diff = end - current;
        let delta = diff.abs();
        let steps = delta.max_element();
        Self {
            current,
            step: diff.signum(),
            delta,
            error: IVec3::ZERO,
            remaining: steps,
            steps,
            started: false,
        }
    }

    fn next(&mut self) -> Option<IVec3> {
        if !self.started {
            self.started = true;
            return Some(self.current);
        }
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        // Each axis accumulates its share of the dominant axis' travel and
        // steps once the accumulated error passes half a tile.
        for axis in 0..3 {
            self.error[axis] += 2 * self.delta[axis];
            if self.error[axis] >= self.steps {
                self.current[axis] += self.step[axis];
                self.error[axis] -= 2 * self.steps;
            }
        }
        Some(self.current)
    }
}

#[derive(Debug)]
enum Walker {
    Conservative(Dda),
    Fast(Bresenham),
    Empty,
}

/// Iterator over the tiles along a segment, from start to end.
#[derive(Debug)]
pub struct TileWalk {
    walker: Walker,
}

impl TileWalk {
    /// Walk `segment` with the given stepping policy.
    ///
    /// Non-finite segments yield nothing.
    pub fn new(segment: Segment, mode: StepMode) -> Self {
        let walker = if !segment.is_finite() {
            Walker::Empty
        } else {
            match mode {
                StepMode::Conservative => Walker::Conservative(Dda::new(&segment)),
                StepMode::Fast => Walker::Fast(Bresenham::new(&segment)),
            }
        };
        Self { walker }
    }
}

impl Iterator for TileWalk {
    type Item = TilePos;

    fn next(&mut self) -> Option<TilePos> {
        let tile = match &mut self.walker {
            Walker::Conservative(dda) => dda.next(),
            Walker::Fast(bresenham) => bresenham.next(),
            Walker::Empty => None,
        };
        tile.map(TilePos::from)
    }
}
