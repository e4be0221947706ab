use glam::Vec2;
use hecs::{Entity, World};
use lib_col::{CollisionResolver, CollisionWorld, Group};
use log::{info, warn};

use crate::config::sections::Movement;
use crate::process::{Scheduler, TaskId, Tickable};
use crate::{Actor, GameCfg, MoveControl, MoveHost, MoveTarget, MoveTask, TileMap, TileRenderer};

pub const GAME_TICKRATE: f32 = 1.0 / 60.0;

/// A tile map with the actors walking on it.
///
/// Actors are ECS entities holding an [Actor] and, if they move on
/// their own, a [MoveControl]. With collisions enabled, every actor is
/// also a box in a [CollisionWorld] keyed by its entity.
pub struct Scene {
    pub map: TileMap,
    pub ecs: World,
    collisions: Option<CollisionWorld>,
}

impl Scene {
    pub fn new(map: TileMap) -> Scene {
        Scene {
            map,
            ecs: World::new(),
            collisions: None,
        }
    }

    /// Turns on actor-vs-actor collisions. Actors already spawned are
    /// added to `world`.
    pub fn with_collisions(mut self, mut world: CollisionWorld) -> Scene {
        for (ent, actor) in self.ecs.query_mut::<&Actor>() {
            world.add(ent, actor.bounds(), Group::ALL);
        }
        self.collisions = Some(world);
        self
    }

    pub fn collisions(&self) -> Option<&CollisionWorld> {
        self.collisions.as_ref()
    }

    pub fn collisions_mut(&mut self) -> Option<&mut CollisionWorld> {
        self.collisions.as_mut()
    }

    pub fn spawn_actor(&mut self, actor: Actor) -> Entity {
        let ent = self.ecs.spawn((actor,));
        world_add(&mut self.collisions, ent, &actor);
        ent
    }

    pub fn spawn_mover(&mut self, actor: Actor, cfg: &Movement) -> Entity {
        let ent = self.ecs.reserve_entity();
        self.ecs.spawn_at(ent, (actor, MoveControl::from_cfg(ent, cfg)));
        world_add(&mut self.collisions, ent, &actor);
        ent
    }

    pub fn despawn(&mut self, ent: Entity) -> bool {
        if let Some(world) = &mut self.collisions {
            world.remove(ent);
        }
        if self.map.follow() == Some(ent) {
            self.map.set_follow(None);
        }
        self.ecs.despawn(ent).is_ok()
    }

    pub fn actor(&self, ent: Entity) -> Option<Actor> {
        self.ecs.get::<&Actor>(ent).ok().map(|actor| *actor)
    }

    /// Runs `f` on the movement control of `ent`.
    pub fn with_mover<R>(&mut self, ent: Entity, f: impl FnOnce(&mut MoveControl) -> R) -> Option<R> {
        self.ecs.query_one_mut::<&mut MoveControl>(ent).ok().map(f)
    }

    /// One movement step of `ent`. Returns `true` if it moved.
    pub fn step_mover(&mut self, ent: Entity) -> bool {
        match self.mover(ent) {
            Some((control, target)) => control.call(target),
            None => false,
        }
    }

    /// Asks the mover `ent` to jump to `pos`.
    pub fn move_to(&mut self, ent: Entity, pos: Vec2) -> bool {
        match self.mover(ent) {
            Some((control, target)) => control.move_to(pos, target),
            None => false,
        }
    }

    pub fn follow(&mut self, ent: Option<Entity>) {
        self.map.set_follow(ent);
        self.update_camera();
    }

    /// Advances the map and puts the camera over the followed actor.
    pub fn update(&mut self, dt: f32) {
        self.map.update(dt);
        self.update_camera();
    }

    fn update_camera(&mut self) {
        let Some(target) = self.map.follow() else {
            return;
        };
        match self.ecs.get::<&Actor>(target) {
            Ok(actor) => self.map.follow_action_object(&*actor),
            Err(_) => {
                warn!("Follow target {target:?} is gone");
                self.map.set_follow(None);
            }
        }
    }
}

fn world_add(world: &mut Option<CollisionWorld>, ent: Entity, actor: &Actor) {
    if let Some(world) = world {
        world.add(ent, actor.bounds(), Group::ALL);
    }
}

impl MoveHost for Scene {
    fn mover(&mut self, item: Entity) -> Option<(&mut MoveControl, MoveTarget<'_>)> {
        let (control, actor) = self
            .ecs
            .query_one_mut::<(&mut MoveControl, &mut Actor)>(item)
            .ok()?;
        let target = MoveTarget {
            field: Some(self.map.field()),
            actor: Some(actor),
            world: self
                .collisions
                .as_mut()
                .map(|world| world as &mut dyn CollisionResolver),
        };
        Some((control, target))
    }
}

/// Owns a [Scene] and the tasks that drive it at a fixed tick rate.
pub struct GameLoop {
    pub scene: Scene,
    scheduler: Scheduler<Scene>,
    accumulated_time: f32,
    ticks: u64,
}

impl GameLoop {
    pub fn new(scene: Scene) -> GameLoop {
        GameLoop {
            scene,
            scheduler: Scheduler::new(),
            accumulated_time: 0.0,
            ticks: 0,
        }
    }

    /// A scene built from the config: the map view, the camera and the
    /// optional collision world.
    pub fn from_cfg(mut map: TileMap, cfg: &GameCfg) -> GameLoop {
        map.set_view_size(cfg.view_size());
        map.set_projection(cfg.map.projection);
        map.set_tint(cfg.render.tint);
        map.set_scroll_step(cfg.camera.scroll_step);
        let mut scene = Scene::new(map);
        if cfg.collision.enabled {
            scene = scene.with_collisions(CollisionWorld::new(cfg.collision.cell_size));
        }
        info!(
            "Scene ready: {}x{} tiles",
            scene.map.width(),
            scene.map.height()
        );
        GameLoop::new(scene)
    }

    pub fn schedule(&mut self, task: impl Tickable<Scene> + 'static, delay: f32) -> TaskId {
        self.scheduler.add(task, delay)
    }

    pub fn schedule_mover(&mut self, item: Entity, delay: f32) -> TaskId {
        self.scheduler.add(MoveTask { item }, delay)
    }

    pub fn scheduler(&self) -> &Scheduler<Scene> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<Scene> {
        &mut self.scheduler
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Feeds real frame time. Runs at most one tick per call and skips
    /// ahead when the frame took longer than two ticks.
    pub fn update(&mut self, real_dt: f32) -> bool {
        self.accumulated_time += real_dt;
        if self.accumulated_time >= 2.0 * GAME_TICKRATE {
            warn!(
                "LAG by {:.2}ms",
                (self.accumulated_time - 2.0 * GAME_TICKRATE) * 1000.0
            );
            self.accumulated_time = 0.0;
            false
        } else if self.accumulated_time >= GAME_TICKRATE {
            self.accumulated_time -= GAME_TICKRATE;
            self.tick(GAME_TICKRATE);
            true
        } else {
            false
        }
    }

    /// Tasks first, then the map and the camera.
    pub fn tick(&mut self, dt: f32) {
        self.scheduler.run(&mut self.scene, dt);
        self.scene.update(dt);
        self.ticks += 1;
    }

    pub fn draw(&mut self, renderer: &mut dyn TileRenderer) -> usize {
        self.scene.map.draw(renderer)
    }
}
