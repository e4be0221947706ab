//! Cost estimates for grid pathfinding.
//!
//! A pathfinder only needs the [AStarFindHeuristic] contract. The
//! built-in estimates live in the closed [Heuristic] enum, which can be
//! picked by name or by its integer type code from configuration.

mod heuristic;

pub use heuristic::*;
