use glam::{Vec2, vec2};
use hecs::Entity;
use lib_col::{Aabb, CollisionResolver, Group};
use lib_field::{Direction, Field2D};
use log::trace;

use crate::config::sections::Movement;
use crate::process::{Tick, Tickable};

/// The capabilities the movement code needs from a moving thing.
pub trait ActionBind {
    fn x(&self) -> f32;
    fn y(&self) -> f32;
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn set_location(&mut self, x: f32, y: f32);

    fn location(&self) -> Vec2 {
        vec2(self.x(), self.y())
    }

    fn size(&self) -> Vec2 {
        vec2(self.width(), self.height())
    }
}

/// A plain box actor. Scenes store it as an ECS component.
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Actor {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Actor {
    pub fn new(pos: Vec2, size: Vec2) -> Actor {
        Actor { pos, size }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }
}

impl ActionBind for Actor {
    fn x(&self) -> f32 {
        self.pos.x
    }

    fn y(&self) -> f32 {
        self.pos.y
    }

    fn width(&self) -> f32 {
        self.size.x
    }

    fn height(&self) -> f32 {
        self.size.y
    }

    fn set_location(&mut self, x: f32, y: f32) {
        self.pos = vec2(x, y);
    }
}

/// Everything a [MoveControl] touches during one step, borrowed for
/// that step only. A missing grid or actor turns the step into a no-op.
#[derive(Default)]
pub struct MoveTarget<'a> {
    pub field: Option<&'a Field2D>,
    pub actor: Option<&'a mut dyn ActionBind>,
    pub world: Option<&'a mut dyn CollisionResolver>,
}

/// Something that owns movers and can lend out their surroundings.
pub trait MoveHost {
    fn mover(&mut self, item: Entity) -> Option<(&mut MoveControl, MoveTarget<'_>)>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    Moving,
}

/// Turns a direction intent into grid-checked position updates for one
/// actor.
///
/// Every step reads the actor, offers the candidate position to the
/// grid and, when the grid lets it through, to the collision world. A
/// blocked step leaves the actor untouched.
#[derive(Clone, Debug)]
pub struct MoveControl {
    item: Entity,
    speed: f32,
    direction: Option<Direction>,
    free_direction: bool,
    vague_scale: f32,
    offset: Vec2,
    filter: Group,
    state: MoveState,
    paused: bool,
    closed: bool,
    last_resolved: Option<Vec2>,
}

impl MoveControl {
    pub fn new(item: Entity) -> MoveControl {
        MoveControl {
            item,
            speed: 1.0,
            direction: None,
            free_direction: false,
            vague_scale: 1.0,
            offset: Vec2::ZERO,
            filter: Group::ALL,
            state: MoveState::Idle,
            paused: false,
            closed: false,
            last_resolved: None,
        }
    }

    pub fn from_cfg(item: Entity, cfg: &Movement) -> MoveControl {
        let mut control = MoveControl::new(item);
        control.set_speed(cfg.speed);
        control.set_vague_scale(cfg.vague_scale);
        control.set_free_direction(cfg.free_direction);
        control
    }

    pub fn item(&self) -> Entity {
        self.item
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Non-finite or negative speeds are ignored.
    pub fn set_speed(&mut self, speed: f32) {
        if speed.is_finite() && speed >= 0.0 {
            self.speed = speed;
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn set_direction(&mut self, dir: Direction) {
        self.direction = Some(dir);
    }

    pub fn clear_direction(&mut self) {
        self.direction = None;
        self.state = MoveState::Idle;
    }

    /// When set, the direction is forgotten after every step.
    pub fn set_free_direction(&mut self, free: bool) {
        self.free_direction = free;
    }

    pub fn is_free_direction(&self) -> bool {
        self.free_direction
    }

    pub fn vague_scale(&self) -> f32 {
        self.vague_scale
    }

    /// Scale of the box used against the grid, relative to the actor
    /// size. Non-positive or non-finite values are ignored.
    pub fn set_vague_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.vague_scale = scale;
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Shift between actor coordinates and grid coordinates.
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn filter(&self) -> Group {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Group) {
        self.filter = filter;
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        self.state == MoveState::Moving
    }

    pub fn last_resolved(&self) -> Option<Vec2> {
        self.last_resolved
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.state = MoveState::Idle;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stops the control for good. A step already running still finishes.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn move_up(&mut self) {
        self.set_direction(Direction::Up);
    }

    pub fn move_down(&mut self) {
        self.set_direction(Direction::Down);
    }

    pub fn move_left(&mut self) {
        self.set_direction(Direction::Left);
    }

    pub fn move_right(&mut self) {
        self.set_direction(Direction::Right);
    }

    pub fn move_true_up(&mut self) {
        self.set_direction(Direction::TrueUp);
    }

    pub fn move_true_down(&mut self) {
        self.set_direction(Direction::TrueDown);
    }

    pub fn move_true_left(&mut self) {
        self.set_direction(Direction::TrueLeft);
    }

    pub fn move_true_right(&mut self) {
        self.set_direction(Direction::TrueRight);
    }

    /// Runs one movement step in the current direction.
    /// Returns `true` if the actor moved.
    pub fn call(&mut self, target: MoveTarget<'_>) -> bool {
        if self.closed || self.paused {
            return false;
        }
        let Some(dir) = self.direction else {
            self.state = MoveState::Idle;
            return false;
        };

        let delta = dir.delta_f32() * self.speed;
        let moved = self.step(target, |pos| pos + delta);
        if self.free_direction {
            self.direction = None;
        }
        moved
    }

    /// Requests a jump to `pos` (actor coordinates) through the same
    /// checks as a regular step.
    pub fn move_to(&mut self, pos: Vec2, target: MoveTarget<'_>) -> bool {
        if self.closed || self.paused {
            return false;
        }
        let offset = self.offset;
        self.step(target, |_| pos - offset)
    }

    fn step(&mut self, target: MoveTarget<'_>, candidate: impl FnOnce(Vec2) -> Vec2) -> bool {
        let MoveTarget {
            field: Some(field),
            actor: Some(actor),
            world,
        } = target
        else {
            trace!("Mover {:?} has no grid or actor, skipping", self.item);
            self.state = MoveState::Idle;
            return false;
        };

        let pos = actor.location() - self.offset;
        let size = actor.size();
        let next = candidate(pos);
        if !next.is_finite() {
            self.state = MoveState::Idle;
            return false;
        }

        let vague = size * self.vague_scale;
        let inset = (size - vague) / 2.0;
        let blocked = field.check_tile_collision(
            pos.x + inset.x,
            pos.y + inset.y,
            vague.x,
            vague.y,
            next.x + inset.x,
            next.y + inset.y,
        );
        if blocked {
            trace!("Mover {:?} blocked by the grid at {next}", self.item);
            self.state = MoveState::Idle;
            return false;
        }

        let resolved = match world {
            Some(world) => world.resolve_move(
                self.item,
                Aabb::from_pos_size(pos, size),
                next,
                self.filter,
            ),
            None => next,
        };
        self.last_resolved = Some(resolved);
        if resolved == pos {
            self.state = MoveState::Idle;
            return false;
        }

        let committed = resolved + self.offset;
        actor.set_location(committed.x, committed.y);
        self.state = MoveState::Moving;
        true
    }
}

/// Scheduler task stepping the mover stored on `item` in a [MoveHost].
/// It finishes once the mover is closed or gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveTask {
    pub item: Entity,
}

impl<H: MoveHost> Tickable<H> for MoveTask {
    fn tick(&mut self, host: &mut H, _dt: f32) -> Tick {
        let Some((control, target)) = host.mover(self.item) else {
            return Tick::Stop;
        };
        if control.is_closed() {
            return Tick::Stop;
        }
        control.call(target);
        if control.is_closed() {
            Tick::Stop
        } else {
            Tick::Continue
        }
    }
}
