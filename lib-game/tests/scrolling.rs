use glam::{Vec2, vec2};
use lib_field::{Field2D, Projection};
use lib_game::*;

const SCROLL_STEPS: usize = 200;
const EPS: f32 = 1e-3;

fn map(width: i32, height: i32) -> TileMap {
    let field = Field2D::new(width, height, 32, 32).unwrap();
    TileMap::new(field, vec2(160.0, 120.0))
}

/// Unscaled corners of the area the tile images cover, taken from
/// where every single tile is put.
fn laid_out(map: &TileMap) -> (Vec2, Vec2) {
    let tile = vec2(map.field().tile_width() as f32, map.field().tile_height() as f32);
    let shift = match map.projection() {
        Projection::Isometric => vec2(-tile.x / 2.0, 0.0),
        _ => Vec2::ZERO,
    };
    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for (x, y, _) in map.field().iter_poses() {
        let pos = (map.tile_to_view(x, y) - map.offset() - map.location()) / map.scale() + shift;
        min = min.min(pos);
        max = max.max(pos + tile);
    }
    (min, max)
}

/// On every axis where the map is larger than the view, the view stays
/// over the map. Smaller maps keep their left or top edge in place.
fn view_over_map(map: &TileMap) -> bool {
    let (min, max) = laid_out(map);
    let first = -map.offset() / map.scale();
    let last = first + map.view_size() / map.scale();
    let view = map.view_size();
    let span = (max - min) * map.scale();
    (0..2).all(|axis| {
        if span[axis] >= view[axis] {
            min[axis] - EPS <= first[axis] && last[axis] <= max[axis] + EPS
        } else {
            (first[axis] - min[axis]).abs() <= EPS
        }
    })
}

#[test]
fn random_scrolling_stays_in_bounds() {
    let maps = [
        (20, 15, Projection::Orthogonal),
        (3, 2, Projection::Orthogonal),
        (5, 40, Projection::Orthogonal),
        (4, 8, Projection::Isometric),
        (12, 3, Projection::Isometric),
        (6, 20, Projection::Staggered),
    ];
    for (width, height, projection) in maps {
        let mut map = map(width, height);
        map.set_projection(projection);
        map.set_offset(map.clamp_offset(Vec2::ZERO));
        assert!(view_over_map(&map), "{width}x{height}: {}", map.offset());
        for _ in 0..SCROLL_STEPS {
            let distance = rand::random_range(0.0..100.0);
            match rand::random_range(0..5) {
                0 => map.scroll_left(distance),
                1 => map.scroll_right(distance),
                2 => map.scroll_up(distance),
                3 => map.scroll_down(distance),
                _ => map.scroll(
                    rand::random_range(-50.0..50.0),
                    rand::random_range(-50.0..50.0),
                ),
            }
            assert!(
                view_over_map(&map),
                "{width}x{height} {projection:?}: {}",
                map.offset()
            );
        }
    }
}

#[test]
fn tall_isometric_map_reaches_both_sides() {
    let field = Field2D::new(4, 8, 32, 32).unwrap();
    let mut map = TileMap::new(field, vec2(64.0, 256.0));
    map.set_projection(Projection::Isometric);
    map.put_tile(0, ImageId(0)).unwrap();
    let mut renderer = RecordingRenderer::new();

    map.scroll_left(1000.0);
    map.draw(&mut renderer);
    let calls = renderer.take();
    let left = calls.iter().map(|call| call.x).fold(f32::INFINITY, f32::min);
    let top = calls.iter().map(|call| call.y).fold(f32::INFINITY, f32::min);
    assert_eq!((left, top), (0.0, 0.0));
    // The far left corner of the diamond
    assert!(calls.iter().any(|call| (call.x, call.y) == (0.0, 112.0)));

    map.scroll_right(1000.0);
    map.draw(&mut renderer);
    let right = renderer
        .take()
        .iter()
        .map(|call| call.x + call.width)
        .fold(f32::NEG_INFINITY, f32::max);
    assert_eq!(right, 64.0);
}

#[test]
fn bad_scroll_is_ignored() {
    let mut map = map(20, 15);
    map.scroll(10.0, 10.0);
    map.scroll(f32::NAN, 5.0);
    map.scroll_left(f32::INFINITY);
    assert_eq!(map.offset(), vec2(-10.0, -10.0));
}

#[test]
fn scaling_widens_the_bounds() {
    let mut map = map(20, 15);
    assert_eq!(map.offset_bounds().0, vec2(-480.0, -360.0));
    map.set_scale(vec2(2.0, 2.0));
    assert_eq!(map.offset_bounds().0, vec2(-1120.0, -840.0));
}

#[test]
fn isometric_extent() {
    let mut map = map(4, 4);
    map.set_projection(Projection::Isometric);
    // A diamond of 4+4 half tiles each way
    assert_eq!(map.map_extent(), vec2(128.0, 128.0));
}

#[test]
fn follow_centers_and_clamps() {
    let mut map = map(20, 15);
    let mut world = hecs::World::new();
    let target = world.spawn(());
    map.set_follow(Some(target));

    let mut actor = Actor::new(vec2(300.0, 200.0), vec2(20.0, 20.0));
    map.follow_action_object(&actor);
    assert_eq!(map.offset(), vec2(80.0 - 310.0, 60.0 - 210.0));

    map.scroll_right(50.0);
    assert_eq!(map.offset(), vec2(-230.0, -150.0));

    actor.pos = vec2(0.0, 0.0);
    map.follow_action_object(&actor);
    assert_eq!(map.offset(), Vec2::ZERO);

    actor.pos = vec2(10_000.0, 10_000.0);
    map.follow_action_object(&actor);
    assert_eq!(map.offset(), map.offset_bounds().0);

    map.set_follow(None);
    map.scroll_left(50.0);
    assert_eq!(map.offset(), vec2(-430.0, -360.0));
}

#[test]
fn random_follow_stays_in_bounds() {
    let mut map = map(20, 15);
    for _ in 0..SCROLL_STEPS {
        let pos = vec2(
            rand::random_range(-200.0..1000.0),
            rand::random_range(-200.0..1000.0),
        );
        map.follow_action_object(&Actor::new(pos, vec2(16.0, 16.0)));
        assert!(view_over_map(&map), "{pos}: {}", map.offset());
    }
}
