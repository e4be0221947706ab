use std::fs;

use anyhow::{Context, bail};
use clap::Parser;
use glam::vec2;
use hashbrown::HashMap;
use lib_game::lib_field::source::{MapDef, parse_char_map};
use lib_game::lib_field::{Direction, Field2D};
use lib_game::lib_path::{AStarFindHeuristic, Heuristic};
use lib_game::*;
use log::{info, warn};

use cli::{Args, Command, MapArgs, MapFormat};

mod cli;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = load_cfg(&args)?;
    match args.command {
        Command::CheckMap { map } => check_map(&map, &cfg),
        Command::DumpMap { map, out } => {
            let text = load_map(&map, &cfg)?.to_def().to_ron()?;
            match out {
                Some(path) => fs::write(&path, text)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{text}"),
            }
            Ok(())
        }
        Command::Simulate {
            map,
            ticks,
            start,
            size,
            direction,
            follow,
            pan,
        } => {
            let camera = match (follow, pan) {
                (true, _) => CameraMode::Follow,
                (false, Some(dir)) => CameraMode::Pan(dir),
                (false, None) => CameraMode::Still,
            };
            simulate(&map, &cfg, ticks, start, size, direction, camera)
        }
        Command::Heuristic {
            sx,
            sy,
            tx,
            ty,
            only,
            all,
        } => {
            for h in pick_heuristics(only, all, &cfg) {
                let name: &'static str = h.into();
                println!("{name} ({}): {}", h.type_code(), h.score(sx, sy, tx, ty));
            }
            Ok(())
        }
    }
}

/// What the camera does during `simulate`.
#[derive(Clone, Copy, Debug, PartialEq)]
enum CameraMode {
    Still,
    Follow,
    Pan(Direction),
}

fn pick_heuristics(only: Option<Heuristic>, all: bool, cfg: &GameCfg) -> Vec<Heuristic> {
    if all {
        return Heuristic::ALL.to_vec();
    }
    vec![only.unwrap_or(cfg.pathing.heuristic)]
}

fn load_cfg(args: &Args) -> anyhow::Result<GameCfg> {
    let mut cfg = match &args.config {
        Some(path) => GameCfg::load(path)?,
        None => GameCfg::default(),
    };
    for item in &args.overrides {
        let Some((name, val)) = item.split_once('=') else {
            bail!("override {item:?} is not SECTION.FIELD=VALUE");
        };
        let Some((section, field)) = name.split_once('.') else {
            bail!("override {item:?} is not SECTION.FIELD=VALUE");
        };
        cfg.set_field(section.trim(), field.trim(), val.trim())?;
    }
    Ok(cfg)
}

fn load_map(args: &MapArgs, cfg: &GameCfg) -> anyhow::Result<Field2D> {
    let text = fs::read_to_string(&args.path)
        .with_context(|| format!("reading map {}", args.path.display()))?;
    let tile_width = args.tile_width.unwrap_or(cfg.map.tile_width);
    let tile_height = args.tile_height.unwrap_or(cfg.map.tile_height);
    let format = args.format.unwrap_or_else(|| MapFormat::guess(&args.path));

    let mut field = match format {
        MapFormat::Csv => Field2D::from_csv(&text, tile_width, tile_height)?,
        MapFormat::Ron => MapDef::from_ron(&text)?.into_field()?,
        MapFormat::Char => {
            if args.chars.is_empty() {
                bail!("char maps need a table, pass --char CHAR=CODE");
            }
            let mapping = args.chars.iter().copied().collect::<HashMap<_, _>>();
            let rows = parse_char_map(&text, &mapping)?;
            Field2D::from_rows(&rows, tile_width, tile_height)?
        }
    };

    if !args.limit.is_empty() {
        let limit = field.limit().iter().chain(&args.limit).copied().collect::<Vec<_>>();
        field.set_limit(limit);
    }
    if !args.allow_move.is_empty() {
        let allow = field
            .allow_move()
            .iter()
            .chain(&args.allow_move)
            .copied()
            .collect::<Vec<_>>();
        field.set_allow_move(allow);
    }
    info!(
        "Loaded {:?} map {}: {}x{} tiles",
        format,
        args.path.display(),
        field.width(),
        field.height()
    );
    Ok(field)
}

fn check_map(args: &MapArgs, cfg: &GameCfg) -> anyhow::Result<()> {
    let field = load_map(args, cfg)?;
    println!(
        "{}x{} tiles of {}x{} pixels ({}x{} pixels)",
        field.width(),
        field.height(),
        field.tile_width(),
        field.tile_height(),
        field.pixel_width(),
        field.pixel_height(),
    );

    let mut codes = field.codes().into_iter().collect::<Vec<_>>();
    codes.sort_unstable();
    for (code, count) in codes {
        let mark = if field.is_blocking_code(code) { " (blocking)" } else { "" };
        println!("code {code}: {count} cells{mark}");
    }

    let blocked = field
        .iter_poses()
        .filter(|(_, _, code)| field.is_blocking_code(*code))
        .count();
    println!("{blocked} of {} cells block movement", field.data().len());
    Ok(())
}

fn simulate(
    args: &MapArgs,
    cfg: &GameCfg,
    ticks: u32,
    start: (f32, f32),
    size: Option<(f32, f32)>,
    direction: Direction,
    camera: CameraMode,
) -> anyhow::Result<()> {
    let field = load_map(args, cfg)?;
    let size = size.map_or_else(
        || vec2(field.tile_width() as f32, field.tile_height() as f32),
        |(w, h)| vec2(w, h),
    );

    let mut map = TileMap::new(field, cfg.view_size());
    let mut codes = map.field().codes().into_keys().collect::<Vec<_>>();
    codes.sort_unstable();
    for code in codes {
        if code >= 0 {
            map.put_tile(code, ImageId(code as u32))?;
        }
    }
    map.complete();

    let mut game = GameLoop::from_cfg(map, cfg);
    let actor = game
        .scene
        .spawn_mover(Actor::new(vec2(start.0, start.1), size), &cfg.movement);
    game.scene
        .with_mover(actor, |control| control.set_direction(direction));
    game.schedule_mover(actor, cfg.movement.delay);
    if camera == CameraMode::Follow {
        game.scene.follow(Some(actor));
    }

    let mut renderer = RecordingRenderer::new();
    for _ in 0..ticks {
        game.tick(GAME_TICKRATE);
        if let CameraMode::Pan(dir) = camera {
            game.scene.map.scroll_toward(dir);
        }
        game.draw(&mut renderer);
    }

    let Some(end) = game.scene.actor(actor) else {
        bail!("actor vanished during the run");
    };
    let state = game.scene.with_mover(actor, |control| control.state());
    if state == Some(MoveState::Idle) {
        warn!("Actor stopped before the run ended");
    }
    let stats = game.scene.map.stats();
    println!("after {} ticks the actor is at {} ({state:?})", game.ticks(), end.pos);
    println!("camera offset {}", game.scene.map.offset());
    println!(
        "{} draw calls, {} rebuilds, {} replays",
        stats.draw_calls, stats.rebuilds, stats.replays
    );
    Ok(())
}
