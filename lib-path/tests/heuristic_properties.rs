use lib_path::{AStarFindHeuristic, Heuristic};
use rand::random_range;
use strum::VariantArray;

const SAMPLE_COUNT: usize = 100_000;
const EPSILON: f32 = 1.0e-3;

fn random_points() -> (f32, f32, f32, f32) {
    (
        random_range(-500.0..500.0),
        random_range(-500.0..500.0),
        random_range(-500.0..500.0),
        random_range(-500.0..500.0),
    )
}

#[test]
fn scores_are_non_negative_and_symmetric() {
    for _ in 0..SAMPLE_COUNT {
        let (sx, sy, tx, ty) = random_points();
        for h in Heuristic::VARIANTS {
            let there = h.score(sx, sy, tx, ty);
            let back = h.score(tx, ty, sx, sy);
            assert!(there >= 0.0, "{h:?} gave {there}");
            assert!(there.is_finite(), "{h:?} gave {there}");
            assert_eq!(there, back, "{h:?} is not symmetric");
        }
    }
}

#[test]
fn zero_on_the_target() {
    for _ in 0..SAMPLE_COUNT {
        let (x, y, _, _) = random_points();
        for h in Heuristic::VARIANTS {
            assert_eq!(h.score(x, y, x, y), 0.0, "{h:?}");
        }
    }
}

#[test]
fn grid_metrics_are_ordered() {
    for _ in 0..SAMPLE_COUNT {
        let (sx, sy, tx, ty) = random_points();
        let chebyshev = Heuristic::Diagonal.score(sx, sy, tx, ty);
        let euclid = Heuristic::Euclidean.score(sx, sy, tx, ty);
        let octile = Heuristic::Octile.score(sx, sy, tx, ty);
        let short = Heuristic::DiagonalShort.score(sx, sy, tx, ty);
        let manhattan = Heuristic::Manhattan.score(sx, sy, tx, ty);

        assert!(chebyshev <= euclid + EPSILON);
        assert!(euclid <= octile + EPSILON);
        assert!(short <= octile + EPSILON);
        assert!(octile <= manhattan + EPSILON);
    }
}
