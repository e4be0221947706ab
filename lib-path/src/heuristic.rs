use std::f32::consts::SQRT_2;

/// Weight of a diagonal step for [Heuristic::DiagonalShort].
pub const DIAGONAL_SHORT_COST: f32 = 1.4;

/// A pathfinding cost estimate between a start and a target cell.
///
/// Implementations must be pure and total: every finite input yields a
/// finite, non-negative score, and the same input always yields the
/// same score.
pub trait AStarFindHeuristic {
    fn score(&self, sx: f32, sy: f32, tx: f32, ty: f32) -> f32;

    /// Stable identifier used to pick an estimate from configuration.
    fn type_code(&self) -> i32;
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::VariantArray,
    strum::IntoStaticStr,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum Heuristic {
    /// `dx + dy`
    #[default]
    Manhattan = 0,
    /// Straight line distance.
    Euclidean = 1,
    /// Squared straight line distance. Cheaper, but overestimates.
    EuclideanSquared = 2,
    /// `max(dx, dy)`, a diagonal step costs as much as a straight one.
    /// Also known as Chebyshev or "closest".
    Diagonal = 3,
    /// Like [Heuristic::Octile] with the diagonal weight rounded to
    /// [DIAGONAL_SHORT_COST].
    DiagonalShort = 4,
    /// A diagonal step costs `sqrt(2)`.
    Octile = 5,
}

impl Heuristic {
    pub const ALL: &'static [Heuristic] = <Heuristic as strum::VariantArray>::VARIANTS;

    pub fn from_type_code(code: i32) -> Option<Heuristic> {
        let heuristic = match code {
            0 => Heuristic::Manhattan,
            1 => Heuristic::Euclidean,
            2 => Heuristic::EuclideanSquared,
            3 => Heuristic::Diagonal,
            4 => Heuristic::DiagonalShort,
            5 => Heuristic::Octile,
            _ => return None,
        };
        Some(heuristic)
    }
}

impl AStarFindHeuristic for Heuristic {
    fn score(&self, sx: f32, sy: f32, tx: f32, ty: f32) -> f32 {
        let dx = (tx - sx).abs();
        let dy = (ty - sy).abs();
        let (short, long) = if dx < dy { (dx, dy) } else { (dy, dx) };
        match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Euclidean => (dx * dx + dy * dy).sqrt(),
            Heuristic::EuclideanSquared => dx * dx + dy * dy,
            Heuristic::Diagonal => long,
            Heuristic::DiagonalShort => DIAGONAL_SHORT_COST * short + (long - short),
            Heuristic::Octile => SQRT_2 * short + (long - short),
        }
    }

    fn type_code(&self) -> i32 {
        *self as i32
    }
}

impl<H: AStarFindHeuristic + ?Sized> AStarFindHeuristic for &H {
    fn score(&self, sx: f32, sy: f32, tx: f32, ty: f32) -> f32 {
        (**self).score(sx, sy, tx, ty)
    }

    fn type_code(&self) -> i32 {
        (**self).type_code()
    }
}

impl<H: AStarFindHeuristic + ?Sized> AStarFindHeuristic for Box<H> {
    fn score(&self, sx: f32, sy: f32, tx: f32, ty: f32) -> f32 {
        (**self).score(sx, sy, tx, ty)
    }

    fn type_code(&self) -> i32 {
        (**self).type_code()
    }
}

#[cfg(test)]
mod tests {
    use strum::VariantArray;

    use super::{AStarFindHeuristic, Heuristic};

    #[test]
    fn sanity() {
        assert_eq!(Heuristic::Euclidean.score(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(Heuristic::Manhattan.score(0.0, 0.0, 3.0, 4.0), 7.0);
        assert_eq!(Heuristic::EuclideanSquared.score(0.0, 0.0, 3.0, 4.0), 25.0);
        assert_eq!(Heuristic::Diagonal.score(0.0, 0.0, 3.0, 4.0), 4.0);
    }

    #[test]
    fn codes_are_stable() {
        for h in Heuristic::VARIANTS {
            assert_eq!(Heuristic::from_type_code(h.type_code()), Some(*h));
        }
        assert_eq!(Heuristic::Manhattan.type_code(), 0);
        assert_eq!(Heuristic::Octile.type_code(), 5);
        assert_eq!(Heuristic::from_type_code(6), None);
        assert_eq!(Heuristic::from_type_code(-1), None);
    }

    #[test]
    fn names() {
        assert_eq!("octile".parse::<Heuristic>(), Ok(Heuristic::Octile));
        let name: &'static str = Heuristic::DiagonalShort.into();
        assert_eq!(name, "diagonal_short");
    }

    #[test]
    fn trait_objects() {
        let boxed: Box<dyn AStarFindHeuristic> = Box::new(Heuristic::Euclidean);
        assert_eq!(boxed.score(1.0, 1.0, 4.0, 5.0), 5.0);
        assert_eq!(boxed.type_code(), 1);
    }
}
