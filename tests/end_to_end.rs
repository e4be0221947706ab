use glam::{Vec2, vec2};
use hecs::World;
use lib_game::lib_field::Field2D;
use lib_game::lib_path::{AStarFindHeuristic, Heuristic};
use lib_game::*;

fn grid() -> Field2D {
    let mut field = Field2D::new(10, 10, 32, 32).unwrap();
    field.set_limit([1]);
    field
}

#[test]
fn blocked_then_opened() {
    let mut field = grid();
    field.set_tile_type(1, 0, 1);
    let mut world = World::new();
    let ent = world.spawn(());
    let mut actor = Actor::new(Vec2::ZERO, vec2(30.0, 30.0));
    let mut control = MoveControl::new(ent);

    let target = MoveTarget {
        field: Some(&field),
        actor: Some(&mut actor),
        world: None,
    };
    assert!(!control.move_to(vec2(32.0, 0.0), target));
    assert_eq!(actor.pos, Vec2::ZERO);
    assert_eq!(control.state(), MoveState::Idle);

    field.set_tile_type(1, 0, 0);
    let target = MoveTarget {
        field: Some(&field),
        actor: Some(&mut actor),
        world: None,
    };
    assert!(control.move_to(vec2(32.0, 0.0), target));
    assert_eq!(actor.pos, vec2(32.0, 0.0));
    assert_eq!(control.state(), MoveState::Moving);
}

#[test]
fn allow_move_lifts_the_block() {
    let mut field = grid();
    field.set_tile_type(1, 0, 1);
    let mut world = World::new();
    let ent = world.spawn(());
    let mut actor = Actor::new(Vec2::ZERO, vec2(30.0, 30.0));
    let mut control = MoveControl::new(ent);

    field.set_allow_move([1]);
    let target = MoveTarget {
        field: Some(&field),
        actor: Some(&mut actor),
        world: None,
    };
    assert!(control.move_to(vec2(32.0, 0.0), target));
    assert_eq!(actor.pos, vec2(32.0, 0.0));
}

#[test]
fn drawn_scene() {
    let mut map = TileMap::new(grid(), vec2(320.0, 320.0));
    map.put_tile(0, ImageId(0)).unwrap();
    map.put_tile(1, ImageId(1)).unwrap();
    map.complete();
    map.set_tile_type(4, 4, 1);

    let mut game = GameLoop::new(Scene::new(map));
    let mut renderer = RecordingRenderer::new();
    assert_eq!(game.draw(&mut renderer), 100);
    let walls = renderer
        .take()
        .into_iter()
        .filter(|call| call.sprite == ImageId(1))
        .collect::<Vec<_>>();
    assert_eq!(walls.len(), 1);
    assert_eq!((walls[0].x, walls[0].y), (128.0, 128.0));
}

#[test]
fn heuristic_sanity() {
    assert_eq!(Heuristic::Euclidean.score(0.0, 0.0, 3.0, 4.0), 5.0);
    assert_eq!(Heuristic::Manhattan.score(0.0, 0.0, 3.0, 4.0), 7.0);
    for h in Heuristic::ALL {
        assert_eq!(Heuristic::from_type_code(h.type_code()), Some(*h));
        assert_eq!(h.score(2.0, 5.0, 2.0, 5.0), 0.0);
    }
}

#[test]
fn bundled_assets_load() {
    let root = env!("CARGO_MANIFEST_DIR");
    let cfg = GameCfg::load(format!("{root}/assets/config.ron")).unwrap();
    assert_eq!(cfg.pathing.heuristic, Heuristic::Octile);
    assert!(cfg.collision.enabled);

    let text = std::fs::read_to_string(format!("{root}/assets/maps/room.csv")).unwrap();
    let mut field = Field2D::from_csv(&text, cfg.map.tile_width, cfg.map.tile_height).unwrap();
    assert_eq!((field.width(), field.height()), (12, 9));
    field.set_limit([1, 2]);
    assert!(!field.is_hit(6, 3));
    field.set_allow_move([2]);
    assert!(field.is_hit(6, 3));
}
