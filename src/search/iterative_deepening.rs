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

//! Runs the two [`super::alpha_beta`] entry points through the depth
//! schedule a turn's search follows: an unconditional, unordered depth-1
//! pass, then history-ordered, quiescence-extended passes at depth 2, 3, …

use crate::{
    defs::Side,
    evaluation::{self, EvalWeights, RngSource},
    history::HistoryTable,
    position::{Action, Position},
    search::alpha_beta,
    transposition_table::TranspositionTable,
};

/// One iterative-deepening pass's outcome.
#[derive(Clone, Copy, Debug)]
pub struct Pass {
    /// The depth just searched.
    pub depth: u32,
    /// The value [`Self::best_action`] was chosen with.
    pub value: f64,
    /// The best action found, or `None` only if the root itself has no
    /// legal moves.
    pub best_action: Option<Action>,
}

/// Runs the unconditional depth-1 pass: no ordering, no quiescence
/// extension, `alpha = -1`, `beta = 2`. Guarantees a legal fallback move
/// exists before any time-bounded deepening begins.
#[must_use]
pub fn first_pass(
    root: &Position,
    maximizer: Side,
    weights: &EvalWeights,
    rng: &mut impl RngSource,
    tt: &mut TranspositionTable,
) -> Pass {
    let (value, best_action) =
        alpha_beta::search_unordered(root, maximizer, 1, -1.0, 2.0, weights, rng, tt);
    Pass {
        depth: 1,
        value,
        best_action,
    }
}

/// Runs one deeper pass at `depth` (2 or greater): history-ordered,
/// quiescence-extended by `floor(sqrt(depth))`, with `alpha` tightened to
/// `evaluate(root, maximizer) - 0.15` and `beta = 2`.
#[must_use]
pub fn next_pass(
    root: &Position,
    maximizer: Side,
    depth: u32,
    weights: &EvalWeights,
    rng: &mut impl RngSource,
    tt: &mut TranspositionTable,
    history: &mut HistoryTable,
) -> Pass {
    let extension = (f64::from(depth).sqrt()).floor() as i32;
    let alpha = evaluation::evaluate(root, maximizer, weights, rng, tt) - 0.15;

    let (value, best_action) = alpha_beta::search(
        root,
        maximizer,
        depth as i32,
        extension,
        alpha,
        2.0,
        weights,
        rng,
        tt,
        history,
    );
    Pass {
        depth,
        value,
        best_action,
    }
}
