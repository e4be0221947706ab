use glam::{Vec2, vec2};

use crate::SWEEP_EPSILON;

/// Axis-aligned box. `min` is the top-left corner in a Y-down world.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

/// The first contact of a moving box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Fraction of the movement done before the contact, in `[0, 1]`.
    pub toi: f32,
    /// Unit axis normal pointing away from the obstacle.
    pub normal: Vec2,
}

impl Aabb {
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Aabb {
        Aabb {
            min: pos,
            max: pos + size,
        }
    }

    pub fn size(self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn translate(self, delta: Vec2) -> Aabb {
        Aabb {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Same size, new top-left corner.
    pub fn with_pos(self, pos: Vec2) -> Aabb {
        Aabb::from_pos_size(pos, self.size())
    }

    pub fn union(self, other: Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlap test that counts touching edges as overlap.
    pub fn overlaps(self, other: Self) -> bool {
        (self.min.x <= other.max.x && self.max.x >= other.min.x)
            && (self.min.y <= other.max.y && self.max.y >= other.min.y)
    }

    /// Overlap test that needs a non-empty shared area.
    pub fn intersects(self, other: Self) -> bool {
        (self.min.x < other.max.x && self.max.x > other.min.x)
            && (self.min.y < other.max.y && self.max.y > other.min.y)
    }

    pub fn contains(self, point: Vec2) -> bool {
        self.min.x <= point.x
            && self.min.y <= point.y
            && point.x <= self.max.x
            && point.y <= self.max.y
    }

    pub fn expand(self, delta: Vec2) -> Aabb {
        Aabb {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// Sweeps `self` by `delta` against the static `other`.
    ///
    /// Grazing contacts (sliding along an edge) are not reported. If the
    /// boxes already intersect, a hit at `toi = 0` is reported only when
    /// the movement goes deeper into `other`.
    pub fn sweep(self, other: Aabb, delta: Vec2) -> Option<SweepHit> {
        // All positions of `self.min` where the two boxes would intersect
        let zone = Aabb {
            min: other.min - self.size(),
            max: other.max,
        };
        let origin = self.min;

        if zone.min.x < origin.x
            && origin.x < zone.max.x
            && zone.min.y < origin.y
            && origin.y < zone.max.y
        {
            let normal = Self::exit_normal(zone, origin);
            if delta.dot(normal) >= 0.0 {
                return None;
            }
            return Some(SweepHit { toi: 0.0, normal });
        }

        let (near_x, far_x) = Self::slab(zone.min.x, zone.max.x, origin.x, delta.x)?;
        let (near_y, far_y) = Self::slab(zone.min.y, zone.max.y, origin.y, delta.y)?;
        let t_enter = near_x.max(near_y);
        let t_exit = far_x.min(far_y);
        if t_exit - t_enter <= SWEEP_EPSILON || !(0.0..=1.0).contains(&t_enter) {
            return None;
        }

        let normal = if near_x > near_y {
            vec2(-delta.x.signum(), 0.0)
        } else {
            vec2(0.0, -delta.y.signum())
        };
        Some(SweepHit {
            toi: t_enter,
            normal,
        })
    }

    /// Entry and exit times along one axis. A still axis either never
    /// overlaps or overlaps for all time.
    fn slab(min: f32, max: f32, origin: f32, delta: f32) -> Option<(f32, f32)> {
        if delta.abs() <= SWEEP_EPSILON {
            if origin <= min || origin >= max {
                return None;
            }
            return Some((f32::NEG_INFINITY, f32::INFINITY));
        }
        let t1 = (min - origin) / delta;
        let t2 = (max - origin) / delta;
        Some((t1.min(t2), t1.max(t2)))
    }

    /// The axis with the shallowest penetration, as an outward normal.
    fn exit_normal(zone: Aabb, origin: Vec2) -> Vec2 {
        let candidates = [
            (origin.x - zone.min.x, vec2(-1.0, 0.0)),
            (zone.max.x - origin.x, vec2(1.0, 0.0)),
            (origin.y - zone.min.y, vec2(0.0, -1.0)),
            (zone.max.y - origin.y, vec2(0.0, 1.0)),
        ];
        candidates
            .into_iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, normal)| normal)
            .unwrap_or(Vec2::ZERO)
    }
}
