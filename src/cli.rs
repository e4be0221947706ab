use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use lib_game::lib_field::Direction;
use lib_game::lib_path::Heuristic;
use strum::VariantArray;

pub type ErrBox = Box<dyn Error + Send + Sync>;

/// Tools for inspecting tile maps and running them headless.
#[derive(Parser, Debug)]
pub struct Args {
    /// Game config in RON. Built-in defaults are used without it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Overrides a config field, like `movement.speed=3.0`.
    #[arg(long = "set", value_name = "SECTION.FIELD=RON", global = true)]
    pub overrides: Vec<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Loads a map and reports its size, codes and blocking cells.
    CheckMap {
        #[command(flatten)]
        map: MapArgs,
    },
    /// Loads a map and prints it as a RON map definition.
    DumpMap {
        #[command(flatten)]
        map: MapArgs,
        /// Write to a file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Walks an actor over a map for a number of ticks and reports
    /// where it ended up and what got drawn.
    Simulate {
        #[command(flatten)]
        map: MapArgs,
        #[arg(long, default_value_t = 60)]
        ticks: u32,
        /// Start of the actor in map pixels.
        #[arg(long, value_name = "X,Y", value_parser = parse_pair, default_value = "0,0")]
        start: (f32, f32),
        /// Size of the actor in pixels. Defaults to one tile.
        #[arg(long, value_name = "W,H", value_parser = parse_pair)]
        size: Option<(f32, f32)>,
        #[arg(long, value_parser = parse_direction, default_value = "true_right")]
        direction: Direction,
        /// Keep the camera on the actor.
        #[arg(long)]
        follow: bool,
        /// Scroll the camera one `camera.scroll_step` per tick instead.
        #[arg(long, value_parser = parse_direction, conflicts_with = "follow")]
        pan: Option<Direction>,
    },
    /// Scores the distance between two cells.
    Heuristic {
        sx: f32,
        sy: f32,
        tx: f32,
        ty: f32,
        /// The estimate to print. Defaults to `pathing.heuristic`.
        #[arg(long, value_parser = parse_heuristic)]
        only: Option<Heuristic>,
        /// Print every estimate.
        #[arg(long, conflicts_with = "only")]
        all: bool,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct MapArgs {
    pub path: PathBuf,
    /// Guessed from the file extension when missing.
    #[arg(long, value_enum)]
    pub format: Option<MapFormat>,
    /// Tile size for formats that do not carry one. Defaults to the
    /// config's map section.
    #[arg(long)]
    pub tile_width: Option<i32>,
    #[arg(long)]
    pub tile_height: Option<i32>,
    /// Extra blocking codes.
    #[arg(long, value_delimiter = ',')]
    pub limit: Vec<i32>,
    /// Codes exempt from blocking.
    #[arg(long, value_delimiter = ',')]
    pub allow_move: Vec<i32>,
    /// Char map table, like `#=1`. Repeat for every char.
    #[arg(long = "char", value_name = "CHAR=CODE", value_parser = parse_char_code)]
    pub chars: Vec<(char, i32)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MapFormat {
    Csv,
    Char,
    Ron,
}

impl MapFormat {
    pub fn guess(path: &Path) -> MapFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => MapFormat::Ron,
            Some("txt") | Some("map") => MapFormat::Char,
            _ => MapFormat::Csv,
        }
    }
}

fn parse_pair(s: &str) -> Result<(f32, f32), ErrBox> {
    let (x, y) = s.split_once(',').ok_or("expected two numbers: X,Y")?;
    Ok((x.trim().parse()?, y.trim().parse()?))
}

fn parse_char_code(s: &str) -> Result<(char, i32), ErrBox> {
    let (ch, code) = s.split_once('=').ok_or("expected CHAR=CODE")?;
    let mut chars = ch.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return Err(format!("{ch:?} is not a single char").into());
    };
    Ok((ch, code.trim().parse()?))
}

fn parse_direction(s: &str) -> Result<Direction, ErrBox> {
    s.parse().map_err(|_| {
        let known = Direction::VARIANTS
            .iter()
            .map(|dir| <&'static str>::from(*dir))
            .collect::<Vec<_>>();
        format!("Unknown direction. Known are: {known:?}").into()
    })
}

fn parse_heuristic(s: &str) -> Result<Heuristic, ErrBox> {
    s.parse().map_err(|_| {
        let known = Heuristic::VARIANTS
            .iter()
            .map(|h| <&'static str>::from(*h))
            .collect::<Vec<_>>();
        format!("Unknown heuristic. Known are: {known:?}").into()
    })
}
