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

//! The turn driver: owns the process-wide history table and transposition
//! caches, and runs one time-budgeted iterative-deepening search per turn.

use std::time::Instant;

use crate::{
    error::EngineError,
    evaluation::{EvalWeights, RngSource, SystemRng},
    history::HistoryTable,
    position::{Action, Position},
    search::{
        iterative_deepening::{first_pass, next_pass},
        time::{should_run_next_depth, turn_budget},
    },
    transport::{PieceHandle, PlayerInfo, TurnContext},
    transposition_table::TranspositionTable,
};

/// Always submitted as the promotion code: the external interfaces never
/// offer a choice, matching the source repository's hardcoded default.
const ALWAYS_PROMOTE_TO: char = 'Q';

/// Owns everything that persists across a match's turns: the history
/// table, the transposition caches, the evaluator's weights, and its
/// source of randomness.
///
/// Generic over [`RngSource`] so tests can swap in [`crate::evaluation::StubRng`];
/// real callers get [`Engine::init`], which wires up [`SystemRng`].
pub struct Engine<R: RngSource = SystemRng> {
    history: HistoryTable,
    tt: TranspositionTable,
    weights: EvalWeights,
    rng: R,
}

impl Engine<SystemRng> {
    /// Constructs an engine with the default evaluator weights and a
    /// system-seeded randomizer. The external "initialize" entry point.
    #[must_use]
    pub fn init() -> Self {
        Self::with_rng(SystemRng::new())
    }
}

impl Default for Engine<SystemRng> {
    fn default() -> Self {
        Self::init()
    }
}

impl<R: RngSource> Engine<R> {
    /// Constructs an engine with a caller-supplied randomizer, for tests
    /// that need a deterministic evaluator.
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            history: HistoryTable::new(),
            tt: TranspositionTable::new(),
            weights: EvalWeights::default(),
            rng,
        }
    }

    /// Plays exactly one turn: builds the root position from `ctx`, runs a
    /// time-budgeted iterative-deepening search, and submits the chosen
    /// move through `ctx`'s piece transport.
    ///
    /// Returns the chosen [`Action`] for inspection (tests check it
    /// without a live transport to submit through).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTurnContext`] if `ctx` cannot be
    /// parsed into a [`Position`], or [`EngineError::NoLegalMoves`] if the
    /// root position already has none (the host framework is expected to
    /// have ended the match before this can happen).
    ///
    /// # Panics
    ///
    /// Panics if the chosen action's piece identity is not reported by
    /// `ctx.own_pieces()`, which would mean `ctx` disagrees with the
    /// position built from it.
    pub fn take_turn<T: TurnContext>(&mut self, ctx: &T) -> Result<Action, EngineError> {
        let t0 = Instant::now();

        let remaining_clock = ctx
            .players()
            .find(|player| player.id() == ctx.acting_player_id())
            .map_or(0.0, |player| player.remaining_clock());
        let budget = turn_budget(remaining_clock, ctx.plies_played());

        let root = Position::from_turn_context(ctx).map_err(EngineError::InvalidTurnContext)?;
        let maximizer = root.side_to_move();

        let branching_factor = crate::movegen::generate_legal_moves(&root, &mut self.tt).len() as u32;

        let search_start = Instant::now();
        let first = first_pass(&root, maximizer, &self.weights, &mut self.rng, &mut self.tt);
        let mut chosen = first.best_action.ok_or(EngineError::NoLegalMoves)?;

        let mut depth = 2_u32;
        while should_run_next_depth(
            branching_factor,
            search_start.elapsed().as_secs_f64(),
            search_start.duration_since(t0).as_secs_f64(),
            budget,
        ) {
            let pass = next_pass(
                &root,
                maximizer,
                depth,
                &self.weights,
                &mut self.rng,
                &mut self.tt,
                &mut self.history,
            );
            if let Some(action) = pass.best_action {
                chosen = action;
            }
            depth += 1;
        }

        let (piece_id, dest) = match chosen {
            Action::Normal { piece_id, dest } => (piece_id, dest),
            Action::Castle {
                king_id, king_dest, ..
            } => (king_id, king_dest),
        };
        let handle = ctx
            .own_pieces()
            .find(|piece| piece.id() == piece_id)
            .expect("chosen action references a piece ctx did not report");
        let (rank, file) = dest.to_external();
        handle.submit_move(file, rank, ALWAYS_PROMOTE_TO);

        Ok(chosen)
    }

    /// The external "teardown" entry point: frees nothing observable, since
    /// dropping `self` already reclaims everything it owns.
    pub fn teardown(self) {}
}
