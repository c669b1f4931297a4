/*
 * Ply, a turn-based chess match core
 * Copyright (C) 2026 The Ply Authors
 *
 * Ply is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Ply is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
 * details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Ply. If not, see <https://www.gnu.org/licenses/>.
 */

//! Ply, the decision-making core of a turn-based chess-playing agent.
//!
//! This crate holds no network client, no authentication handshake and no
//! board renderer: it consumes a snapshot of a game in progress (see
//! [`transport`]) and a time budget, and produces a single legal [`Action`].
//! Everything a surrounding game framework needs from this crate is exposed
//! through [`engine::Engine`].

/// Definitions and enumerations: coordinates, piece kinds, sides.
mod defs;
/// Engine-internal error kinds.
pub mod error;
/// Evaluator: a heuristic estimate of how good a position is for one side.
pub mod evaluation;
/// Per-turn orchestration: build a position, budget time, drive the search.
pub mod engine;
/// History table: move-ordering popularity counts.
pub mod history;
/// Move generation: legal and pseudo-legal moves for a position.
pub mod movegen;
/// The position model: squares, pieces, actions and the position snapshot.
pub mod position;
/// Iterative-deepening alpha-beta search.
pub mod search;
/// Test-only fixtures exercising the end-to-end scenarios from the design.
#[cfg(test)]
mod tests;
/// The transposition cache: memoized move lists, evaluations and check flags.
pub mod transposition_table;
/// External interfaces this crate consumes from its host framework.
pub mod transport;

pub use defs::{PieceKind, Side, Square};
pub use engine::Engine;
pub use position::{Action, Piece, Position};
