mod common;

use glam::{Vec2, vec2};
use lib_col::{Aabb, SweepHit};

use crate::common::{FuzzableTestCase, TestCase, run_tests};

#[derive(Debug, Clone, Copy)]
struct SweepTest {
    name: &'static str,
    mover: Aabb,
    obstacle: Aabb,
    delta: Vec2,
    expected: Option<SweepHit>,
}

impl TestCase for SweepTest {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self) -> bool {
        let res = self.mover.sweep(self.obstacle, self.delta);
        println!("Got: {res:?}");
        match (res, self.expected) {
            (None, None) => true,
            (Some(res), Some(expected)) => {
                (res.toi - expected.toi).abs() <= 1e-4 && res.normal == expected.normal
            }
            _ => false,
        }
    }
}

impl FuzzableTestCase for SweepTest {
    fn translate(self, offset: Vec2) -> Self {
        SweepTest {
            mover: self.mover.translate(offset),
            obstacle: self.obstacle.translate(offset),
            ..self
        }
    }
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Aabb {
    Aabb::from_pos_size(vec2(x, y), vec2(w, h))
}

#[test]
fn axis_sweeps() {
    run_tests([
        SweepTest {
            name: "right into wall",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(32.0, 0.0, 16.0, 16.0),
            delta: vec2(32.0, 0.0),
            expected: Some(SweepHit {
                toi: 0.5,
                normal: vec2(-1.0, 0.0),
            }),
        },
        SweepTest {
            name: "left into wall",
            mover: rect(64.0, 0.0, 16.0, 16.0),
            obstacle: rect(32.0, 0.0, 16.0, 16.0),
            delta: vec2(-32.0, 0.0),
            expected: Some(SweepHit {
                toi: 0.5,
                normal: vec2(1.0, 0.0),
            }),
        },
        SweepTest {
            name: "down onto floor",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(-64.0, 32.0, 128.0, 16.0),
            delta: vec2(0.0, 64.0),
            expected: Some(SweepHit {
                toi: 0.25,
                normal: vec2(0.0, -1.0),
            }),
        },
        SweepTest {
            name: "stops right at the face",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(32.0, 0.0, 16.0, 16.0),
            delta: vec2(16.0, 0.0),
            expected: Some(SweepHit {
                toi: 1.0,
                normal: vec2(-1.0, 0.0),
            }),
        },
        SweepTest {
            name: "falls short",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(32.0, 0.0, 16.0, 16.0),
            delta: vec2(8.0, 0.0),
            expected: None,
        },
        SweepTest {
            name: "moving away",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(32.0, 0.0, 16.0, 16.0),
            delta: vec2(-32.0, 0.0),
            expected: None,
        },
        SweepTest {
            name: "passes above",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(32.0, 32.0, 16.0, 16.0),
            delta: vec2(64.0, 0.0),
            expected: None,
        },
        SweepTest {
            name: "grazes an edge",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(32.0, 16.0, 16.0, 16.0),
            delta: vec2(64.0, 0.0),
            expected: None,
        },
        SweepTest {
            name: "no movement",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(32.0, 0.0, 16.0, 16.0),
            delta: Vec2::ZERO,
            expected: None,
        },
    ])
}

#[test]
fn diagonal_sweeps() {
    run_tests([
        SweepTest {
            name: "diagonal hits the side",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(32.0, 0.0, 16.0, 64.0),
            delta: vec2(32.0, 32.0),
            expected: Some(SweepHit {
                toi: 0.5,
                normal: vec2(-1.0, 0.0),
            }),
        },
        SweepTest {
            name: "diagonal hits the top",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(0.0, 32.0, 64.0, 16.0),
            delta: vec2(16.0, 32.0),
            expected: Some(SweepHit {
                toi: 0.5,
                normal: vec2(0.0, -1.0),
            }),
        },
        SweepTest {
            name: "diagonal misses the corner",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(32.0, 32.0, 16.0, 16.0),
            delta: vec2(32.0, -32.0),
            expected: None,
        },
    ])
}

#[test]
fn starting_inside() {
    run_tests([
        SweepTest {
            name: "pushing deeper",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(12.0, 0.0, 16.0, 16.0),
            delta: vec2(8.0, 0.0),
            expected: Some(SweepHit {
                toi: 0.0,
                normal: vec2(-1.0, 0.0),
            }),
        },
        SweepTest {
            name: "backing out",
            mover: rect(0.0, 0.0, 16.0, 16.0),
            obstacle: rect(12.0, 0.0, 16.0, 16.0),
            delta: vec2(-8.0, 0.0),
            expected: None,
        },
    ])
}
