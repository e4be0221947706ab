//! Textual map sources. Three encodings are supported:
//! * CSV: one grid row per line, codes separated by commas and/or
//!   whitespace. Blank lines and lines starting with `#` are skipped.
//! * Char maps: one character per cell, translated through a table.
//! * [MapDef]: a RON document carrying the grid and its rules.
//!
//! Rows are always stored Y first, then X.

use glam::Vec2;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{Field2D, SourceError};

/// Parses a CSV grid into rows.
pub fn parse_csv(text: &str) -> Result<Vec<Vec<i32>>, SourceError> {
    let mut rows: Vec<Vec<i32>> = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .enumerate()
            .map(|(column, token)| {
                token.parse::<i32>().map_err(|_| SourceError::BadToken {
                    line: line_idx + 1,
                    column: column + 1,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        check_row_len(&rows, &row, line_idx)?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(SourceError::Empty);
    }
    Ok(rows)
}

/// Parses a char map. Every character of a non-empty line is a cell and
/// must have an entry in `mapping`.
pub fn parse_char_map(
    text: &str,
    mapping: &HashMap<char, i32>,
) -> Result<Vec<Vec<i32>>, SourceError> {
    let mut rows: Vec<Vec<i32>> = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let row = line
            .chars()
            .enumerate()
            .map(|(column, ch)| {
                mapping
                    .get(&ch)
                    .copied()
                    .ok_or(SourceError::UnknownChar {
                        line: line_idx + 1,
                        column: column + 1,
                        ch,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        check_row_len(&rows, &row, line_idx)?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(SourceError::Empty);
    }
    Ok(rows)
}

fn check_row_len(rows: &[Vec<i32>], row: &[i32], line_idx: usize) -> Result<(), SourceError> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    if first.len() != row.len() {
        return Err(SourceError::Ragged {
            line: line_idx + 1,
            expected: first.len(),
            found: row.len(),
        });
    }
    Ok(())
}

/// The plain-data definition of a grid. Rule sets default to empty
/// so hand-written files can omit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDef {
    /// Map width in tiles
    pub width: i32,
    /// Map height in tiles
    pub height: i32,
    /// Tile width in pixels
    pub tile_width: i32,
    /// Tile height in pixels
    pub tile_height: i32,
    /// Tile codes in row-major order
    pub tiles: Vec<i32>,
    /// Codes that block movement
    #[serde(default)]
    pub limit: Vec<i32>,
    /// Codes exempt from `limit`
    #[serde(default)]
    pub allow_move: Vec<i32>,
    #[serde(default)]
    pub offset: Vec2,
}

impl MapDef {
    pub fn from_ron(text: &str) -> Result<MapDef, SourceError> {
        ron::from_str(text).map_err(Into::into)
    }

    pub fn to_ron(&self) -> Result<String, SourceError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(Into::into)
    }

    pub fn into_field(self) -> Result<Field2D, SourceError> {
        let mut field = Field2D::from_data(
            self.width,
            self.height,
            self.tile_width,
            self.tile_height,
            self.tiles,
        )?;
        field.set_limit(self.limit);
        field.set_allow_move(self.allow_move);
        field.set_offset(self.offset);
        Ok(field)
    }
}

impl Field2D {
    pub fn from_csv(text: &str, tile_width: i32, tile_height: i32) -> Result<Field2D, SourceError> {
        let rows = parse_csv(text)?;
        Field2D::from_rows(&rows, tile_width, tile_height).map_err(Into::into)
    }

    pub fn from_char_map(
        text: &str,
        mapping: &HashMap<char, i32>,
        tile_width: i32,
        tile_height: i32,
    ) -> Result<Field2D, SourceError> {
        let rows = parse_char_map(text, mapping)?;
        Field2D::from_rows(&rows, tile_width, tile_height).map_err(Into::into)
    }

    /// Snapshot of the grid as a plain definition. Rule sets are sorted
    /// so the output is stable.
    pub fn to_def(&self) -> MapDef {
        let mut limit = self.limit().iter().copied().collect::<Vec<_>>();
        let mut allow_move = self.allow_move().iter().copied().collect::<Vec<_>>();
        limit.sort_unstable();
        allow_move.sort_unstable();

        MapDef {
            width: self.width(),
            height: self.height(),
            tile_width: self.tile_width(),
            tile_height: self.tile_height(),
            tiles: self.data().to_vec(),
            limit,
            allow_move,
            offset: self.offset(),
        }
    }
}
