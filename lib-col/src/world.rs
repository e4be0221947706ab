use glam::{IVec2, Vec2, ivec2};
use hashbrown::{HashMap, HashSet};
use hecs::Entity;

use crate::{Aabb, Group, SweepHit};

pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// Upper bound on collisions resolved during a single move.
const MAX_RESPONSES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub rect: Aabb,
    pub group: Group,
}

/// What a mover does after touching another item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Response {
    /// Stop at the contact point.
    Touch,
    /// Pass through, but still report the contact.
    Cross,
    /// Drop the blocked axis and keep going along the other one.
    Slide,
    /// Mirror the rest of the movement along the blocked axis.
    Bounce,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub other: Entity,
    pub toi: f32,
    pub normal: Vec2,
    /// Position of the mover at the moment of contact.
    pub touch: Vec2,
    pub response: Response,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveResult {
    /// Final top-left corner of the mover.
    pub pos: Vec2,
    pub collisions: Vec<Collision>,
}

/// Anything that can turn a wanted move of a box into an allowed one.
pub trait CollisionResolver {
    /// Moves `item` with the given `bounds` towards `target` (a new top-left
    /// corner) and returns where it may actually go. Only items sharing a
    /// layer with `filter` block the move.
    fn resolve_move(&mut self, item: Entity, bounds: Aabb, target: Vec2, filter: Group) -> Vec2;
}

/// A uniform-grid broad phase over axis-aligned boxes.
///
/// Movement is resolved by sweeping the mover against everything in the
/// cells it passes through, one contact at a time.
pub struct CollisionWorld {
    cell_size: f32,
    items: HashMap<Entity, Item>,
    cells: HashMap<IVec2, Vec<Entity>>,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        CollisionWorld::new(DEFAULT_CELL_SIZE)
    }
}

impl CollisionWorld {
    /// A bad cell size falls back to [DEFAULT_CELL_SIZE].
    pub fn new(cell_size: f32) -> CollisionWorld {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("Bad cell size {cell_size}, using {DEFAULT_CELL_SIZE}");
            DEFAULT_CELL_SIZE
        };

        CollisionWorld {
            cell_size,
            items: HashMap::new(),
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, ent: Entity) -> bool {
        self.items.contains_key(&ent)
    }

    pub fn get(&self, ent: Entity) -> Option<Item> {
        self.items.get(&ent).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, Item)> + '_ {
        self.items.iter().map(|(ent, item)| (*ent, *item))
    }

    /// Inserts or replaces an item.
    pub fn add(&mut self, ent: Entity, rect: Aabb, group: Group) {
        if self.items.contains_key(&ent) {
            self.remove(ent);
        }
        self.items.insert(ent, Item { rect, group });
        for cell in self.cells_of(rect) {
            self.cells.entry(cell).or_default().push(ent);
        }
    }

    pub fn remove(&mut self, ent: Entity) -> Option<Item> {
        let item = self.items.remove(&ent)?;
        for cell in self.cells_of(item.rect) {
            let Some(bucket) = self.cells.get_mut(&cell) else {
                continue;
            };
            bucket.retain(|other| *other != ent);
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
        Some(item)
    }

    /// Moves an existing item. Returns `false` if the item is unknown.
    pub fn update(&mut self, ent: Entity, rect: Aabb) -> bool {
        let Some(item) = self.items.get(&ent).copied() else {
            return false;
        };
        if item.rect != rect {
            self.add(ent, rect, item.group);
        }
        true
    }

    pub fn set_group(&mut self, ent: Entity, group: Group) -> bool {
        let Some(item) = self.items.get_mut(&ent) else {
            return false;
        };
        item.group = group;
        true
    }

    /// All items whose box shares area with `rect` and a layer with `filter`.
    /// The output is sorted.
    pub fn query_rect(&self, rect: Aabb, filter: Group) -> Vec<Entity> {
        let mut found = self
            .candidates(rect)
            .into_iter()
            .filter(|ent| {
                self.items
                    .get(ent)
                    .is_some_and(|item| item.group.overlaps(filter) && item.rect.intersects(rect))
            })
            .collect::<Vec<_>>();
        found.sort_unstable();
        found
    }

    /// All items containing `point`, edges included. The output is sorted.
    pub fn query_point(&self, point: Vec2, filter: Group) -> Vec<Entity> {
        let spot = Aabb {
            min: point,
            max: point,
        };
        let mut found = self
            .candidates(spot)
            .into_iter()
            .filter(|ent| {
                self.items
                    .get(ent)
                    .is_some_and(|item| item.group.overlaps(filter) && item.rect.contains(point))
            })
            .collect::<Vec<_>>();
        found.sort_unstable();
        found
    }

    /// Computes where `ent` would end up when moved to `goal`, without
    /// moving it. `filter` decides the response for every other item, or
    /// `None` to ignore it.
    pub fn check(
        &self,
        ent: Entity,
        goal: Vec2,
        filter: impl Fn(Entity, &Item) -> Option<Response>,
    ) -> MoveResult {
        let Some(item) = self.items.get(&ent) else {
            return MoveResult {
                pos: goal,
                collisions: Vec::new(),
            };
        };

        let mut visited = HashSet::new();
        visited.insert(ent);
        let mut rect = item.rect;
        let mut goal = goal;
        let mut collisions = Vec::new();

        while collisions.len() < MAX_RESPONSES {
            let Some((other, hit, response)) = self.first_contact(rect, goal, &visited, &filter)
            else {
                break;
            };
            visited.insert(other);

            let delta = goal - rect.min;
            let touch = rect.min + delta * hit.toi;
            collisions.push(Collision {
                other,
                toi: hit.toi,
                normal: hit.normal,
                touch,
                response,
            });

            match response {
                Response::Touch => {
                    goal = touch;
                    break;
                }
                Response::Cross => (),
                Response::Slide => {
                    if hit.normal.x != 0.0 {
                        goal.x = touch.x;
                    } else {
                        goal.y = touch.y;
                    }
                    rect = rect.with_pos(touch);
                }
                Response::Bounce => {
                    let mut rest = goal - touch;
                    if hit.normal.x != 0.0 {
                        rest.x = -rest.x;
                    } else {
                        rest.y = -rest.y;
                    }
                    goal = touch + rest;
                    rect = rect.with_pos(touch);
                }
            }
        }

        MoveResult {
            pos: goal,
            collisions,
        }
    }

    /// Like [CollisionWorld::check], but also moves the item.
    pub fn move_item(
        &mut self,
        ent: Entity,
        goal: Vec2,
        filter: impl Fn(Entity, &Item) -> Option<Response>,
    ) -> MoveResult {
        let result = self.check(ent, goal, filter);
        if let Some(item) = self.items.get(&ent).copied() {
            self.update(ent, item.rect.with_pos(result.pos));
        }
        result
    }

    fn first_contact(
        &self,
        rect: Aabb,
        goal: Vec2,
        visited: &HashSet<Entity>,
        filter: &impl Fn(Entity, &Item) -> Option<Response>,
    ) -> Option<(Entity, SweepHit, Response)> {
        let delta = goal - rect.min;
        let path = rect.union(rect.with_pos(goal));
        let mut contacts = self
            .candidates(path)
            .into_iter()
            .filter(|other| !visited.contains(other))
            .filter_map(|other| {
                let item = self.items.get(&other)?;
                let response = filter(other, item)?;
                let hit = rect.sweep(item.rect, delta)?;
                let dist = rect.center().distance_squared(item.rect.center());
                Some((other, hit, response, dist))
            })
            .collect::<Vec<_>>();

        contacts.sort_by(|a, b| {
            a.1.toi
                .total_cmp(&b.1.toi)
                .then(a.3.total_cmp(&b.3))
                .then(a.0.cmp(&b.0))
        });
        contacts
            .first()
            .map(|(other, hit, response, _)| (*other, *hit, *response))
    }

    fn candidates(&self, rect: Aabb) -> HashSet<Entity> {
        self.cells_of(rect)
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .copied()
            .collect()
    }

    fn cells_of(&self, rect: Aabb) -> impl Iterator<Item = IVec2> + use<> {
        let (lo, hi) = if rect.min.is_finite() && rect.max.is_finite() {
            (
                (rect.min / self.cell_size).floor().as_ivec2(),
                (rect.max / self.cell_size).floor().as_ivec2(),
            )
        } else {
            (IVec2::ONE, IVec2::ZERO)
        };
        (lo.y..=hi.y).flat_map(move |y| (lo.x..=hi.x).map(move |x| ivec2(x, y)))
    }
}

/// A filter that slides along every item sharing a layer with `mask`.
pub fn slide_filter(mask: Group) -> impl Fn(Entity, &Item) -> Option<Response> {
    move |_, item| item.group.overlaps(mask).then_some(Response::Slide)
}

impl CollisionResolver for CollisionWorld {
    fn resolve_move(&mut self, item: Entity, bounds: Aabb, target: Vec2, filter: Group) -> Vec2 {
        if !self.update(item, bounds) {
            self.add(item, bounds, Group::ALL);
        }
        self.move_item(item, target, slide_filter(filter)).pos
    }
}
