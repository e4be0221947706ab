use std::ops::{BitAnd, BitOr};

pub const GROUP_COUNT: usize = 32;

/// A set of up to [GROUP_COUNT] collision layers packed into a `u32`.
///
/// An item stores the layers it lives on. A mover passes a mask of the
/// layers it bumps into, and the two interact when they share a layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, serde::Deserialize, serde::Serialize)]
#[repr(transparent)]
pub struct Group(pub u32);

impl Group {
    pub const EMPTY: Group = Group(0);
    pub const ALL: Group = Group(u32::MAX);

    pub const fn empty() -> Group {
        Group::EMPTY
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The group holding only layer `idx`. Layers past [GROUP_COUNT]
    /// yield an empty group.
    pub const fn from_id(idx: u32) -> Group {
        Group(1u32.unbounded_shl(idx))
    }

    pub const fn union(self, other: Group) -> Group {
        Group(self.0 | other.0)
    }

    pub const fn intersection(self, other: Group) -> Group {
        Group(self.0 & other.0)
    }

    /// `self` with layer `idx` removed.
    pub const fn without(self, idx: u32) -> Group {
        Group(self.0 & !Group::from_id(idx).0)
    }

    pub const fn contains(self, idx: u32) -> bool {
        self.includes(Group::from_id(idx))
    }

    /// Subset check: every layer of `target` is in `self`.
    pub const fn includes(self, target: Group) -> bool {
        self.0 & target.0 == target.0
    }

    /// `true` when the two groups share at least one layer.
    pub const fn overlaps(self, other: Group) -> bool {
        !self.intersection(other).is_empty()
    }
}

impl BitOr for Group {
    type Output = Group;

    fn bitor(self, rhs: Group) -> Group {
        self.union(rhs)
    }
}

impl BitAnd for Group {
    type Output = Group;

    fn bitand(self, rhs: Group) -> Group {
        self.intersection(rhs)
    }
}
