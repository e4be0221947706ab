use glam::{IVec2, Vec2, ivec2};

/// Movement directions. The compass variants follow the diamond
/// (isometric) screen layout, so the screen-aligned ones ([Direction::Up],
/// [Direction::Down], [Direction::Left], [Direction::Right]) travel along
/// both grid axes at once. The `True*` variants always travel along a
/// single grid axis.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    TrueUp,
    TrueDown,
    TrueLeft,
    TrueRight,
}

impl Direction {
    pub const TRUE: [Direction; 4] = [
        Direction::TrueUp,
        Direction::TrueRight,
        Direction::TrueDown,
        Direction::TrueLeft,
    ];

    /// The directions that move along both axes.
    pub const DIAGONAL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Grid step for one unit of movement.
    pub const fn delta(self) -> IVec2 {
        match self {
            Direction::Up => ivec2(-1, -1),
            Direction::Down => ivec2(1, 1),
            Direction::Left => ivec2(-1, 1),
            Direction::Right => ivec2(1, -1),
            Direction::UpLeft | Direction::TrueLeft => ivec2(-1, 0),
            Direction::UpRight | Direction::TrueUp => ivec2(0, -1),
            Direction::DownLeft | Direction::TrueDown => ivec2(0, 1),
            Direction::DownRight | Direction::TrueRight => ivec2(1, 0),
        }
    }

    pub fn delta_f32(self) -> Vec2 {
        self.delta().as_vec2()
    }

    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::Up | Direction::Down | Direction::Left | Direction::Right
        )
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::UpLeft => Direction::DownRight,
            Direction::UpRight => Direction::DownLeft,
            Direction::DownLeft => Direction::UpRight,
            Direction::DownRight => Direction::UpLeft,
            Direction::TrueUp => Direction::TrueDown,
            Direction::TrueDown => Direction::TrueUp,
            Direction::TrueLeft => Direction::TrueRight,
            Direction::TrueRight => Direction::TrueLeft,
        }
    }

    /// Picks a direction from a step. Single-axis steps map onto the
    /// `True*` variants, two-axis steps onto the diagonal ones.
    /// Returns [None] for a zero step.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        let dir = match (dx.signum(), dy.signum()) {
            (0, 0) => return None,
            (0, -1) => Direction::TrueUp,
            (0, 1) => Direction::TrueDown,
            (-1, 0) => Direction::TrueLeft,
            (1, 0) => Direction::TrueRight,
            (-1, -1) => Direction::Up,
            (1, 1) => Direction::Down,
            (-1, 1) => Direction::Left,
            _ => Direction::Right,
        };
        Some(dir)
    }
}

#[cfg(test)]
mod tests {
    use strum::VariantArray;

    use super::Direction;

    #[test]
    fn from_delta_inverts_true_and_diagonal() {
        for dir in Direction::TRUE.into_iter().chain(Direction::DIAGONAL) {
            let d = dir.delta();
            assert_eq!(Direction::from_delta(d.x, d.y), Some(dir));
        }
        assert_eq!(Direction::from_delta(0, 0), None);
    }

    #[test]
    fn opposite_cancels_out() {
        for dir in Direction::VARIANTS {
            assert_eq!(dir.delta() + dir.opposite().delta(), glam::IVec2::ZERO);
            assert_eq!(dir.opposite().opposite(), *dir);
        }
    }

    #[test]
    fn true_directions_use_one_axis() {
        for dir in Direction::TRUE {
            let d = dir.delta();
            assert_eq!(d.x.abs() + d.y.abs(), 1, "{dir:?}");
            assert!(!dir.is_diagonal());
        }
        for dir in Direction::DIAGONAL {
            let d = dir.delta();
            assert_eq!(d.x.abs() + d.y.abs(), 2, "{dir:?}");
        }
    }

    #[test]
    fn names_parse() {
        assert_eq!("true_right".parse::<Direction>(), Ok(Direction::TrueRight));
        let name: &'static str = Direction::UpLeft.into();
        assert_eq!(name, "up_left");
    }
}
