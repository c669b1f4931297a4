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

//! The static evaluator: a heuristic estimate, in `[0, 1]`, of how good a
//! position is for a given side. `1.0` is winning for the queried side.

use crate::{
    defs::{PieceKind, Side, Square},
    movegen,
    position::Position,
    transposition_table::TranspositionTable,
};

/// A source of randomness for the evaluator's randomizer component.
///
/// Abstracted so tests can stub it to a fixed value: the randomizer makes
/// the evaluator (and therefore the search) nondeterministic by design,
/// which is unusable in a reproducible test.
pub trait RngSource {
    /// Draws one of the eleven values `0.0, 0.1, .., 1.0` uniformly.
    fn sample_decile(&mut self) -> f64;
}

/// The real randomizer, backed by [`oorandom`] seeded from OS randomness.
pub struct SystemRng(oorandom::Rand32);

/// A stub randomizer that always returns `0.5`, for deterministic tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubRng;

impl SystemRng {
    /// Seeds a new randomizer from the operating system's entropy source.
    ///
    /// # Panics
    ///
    /// Panics if the OS randomness source is unavailable.
    #[must_use]
    pub fn new() -> Self {
        let mut seed_bytes = [0_u8; 8];
        getrandom::getrandom(&mut seed_bytes).expect("OS randomness source unavailable");
        Self(oorandom::Rand32::new(u64::from_le_bytes(seed_bytes)))
    }
}

impl Default for SystemRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngSource for SystemRng {
    fn sample_decile(&mut self) -> f64 {
        f64::from(self.0.rand_range(0..11)) / 10.0
    }
}

impl RngSource for StubRng {
    fn sample_decile(&mut self) -> f64 {
        0.5
    }
}

/// The contractual weights of each evaluation component. The default
/// matches the specified composite formula exactly; `coverage_share`
/// defaults to `0.0` (disabled) since it is not part of that formula.
#[derive(Clone, Copy, Debug)]
pub struct EvalWeights {
    /// Weight of `(own_score - opp_score + 39) / 78`.
    pub material_advantage: f64,
    /// Weight of `own_score / (own_score + opp_score)`.
    pub material_share: f64,
    /// Weight of `own_chain / (own_chain + opp_chain + epsilon)`.
    pub pawn_chain_share: f64,
    /// Weight of `own_chain / 14`.
    pub pawn_structure: f64,
    /// Weight of the in-check asymmetry term.
    pub check_pressure: f64,
    /// Weight of the uniform randomizer term.
    pub randomizer: f64,
    /// Weight of the board-coverage term. Present in the source as a
    /// written-but-disabled heuristic; `0.0` reproduces the always-on
    /// contractual weights exactly.
    pub coverage_share: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            material_advantage: 0.45,
            material_share: 0.45,
            pawn_chain_share: 0.02,
            pawn_structure: 0.02,
            check_pressure: 0.05,
            randomizer: 0.01,
            coverage_share: 0.0,
        }
    }
}

/// The epsilon that keeps [`EvalWeights::pawn_chain_share`] finite when
/// neither side has a pawn chain.
const PAWN_CHAIN_EPSILON: f64 = 0.0001;

/// Evaluates `position` for `side`, consulting and populating the
/// evaluation cache in `tt`.
///
/// A cache hit returns the previously computed value verbatim, including
/// whatever randomizer sample it was drawn with: the cache is keyed by
/// position fingerprint only, exactly as specified.
#[must_use]
pub fn evaluate(
    position: &Position,
    side: Side,
    weights: &EvalWeights,
    rng: &mut impl RngSource,
    tt: &mut TranspositionTable,
) -> f64 {
    let fingerprint = position.fingerprint();
    if let Some(cached) = tt.cached_evaluation(fingerprint) {
        return cached;
    }

    let (own_material, opp_material) = material_scores(position, side);
    let own_chain = pawn_chain_score(position, side);
    let opp_chain = pawn_chain_score(position, side.flip());

    let material_advantage = (own_material - opp_material + 39.0) / 78.0;
    let material_share = if own_material + opp_material == 0.0 {
        0.0
    } else {
        own_material / (own_material + opp_material)
    };
    let pawn_chain_share = own_chain / (own_chain + opp_chain + PAWN_CHAIN_EPSILON);
    let pawn_structure = own_chain / 14.0;
    let check_pressure = check_pressure(position, side);
    let randomizer = rng.sample_decile();
    let coverage_share = if weights.coverage_share == 0.0 {
        0.0
    } else {
        coverage_share(position, side)
    };

    let value = weights.material_advantage * material_advantage
        + weights.material_share * material_share
        + weights.pawn_chain_share * pawn_chain_share
        + weights.pawn_structure * pawn_structure
        + weights.check_pressure * check_pressure
        + weights.randomizer * randomizer
        + weights.coverage_share * coverage_share;

    tt.store_evaluation(fingerprint, value);
    value
}

/// Total material for `side` and its opponent, in pawns (kings uncounted).
fn material_scores(position: &Position, side: Side) -> (f64, f64) {
    let sum = |s: Side| -> f64 {
        position
            .pieces(s)
            .iter()
            .map(|p| f64::from(p.kind.material_value()))
            .sum()
    };
    (sum(side), sum(side.flip()))
}

/// `side`'s pawn-chain score: `+1` per own pawn on an adjacent file of the
/// same rank, `+2` per own pawn diagonally behind (from `side`'s own
/// advancing direction).
fn pawn_chain_score(position: &Position, side: Side) -> f64 {
    let dir = side.pawn_direction();
    let mut score = 0.0;

    for pawn in position.pieces(side).iter().filter(|p| p.kind == PieceKind::PAWN) {
        for file_delta in [-1_i8, 1] {
            if adjacent_is_friendly_pawn(position, pawn.square, 0, file_delta, side) {
                score += 1.0;
            }
            if adjacent_is_friendly_pawn(position, pawn.square, -dir, file_delta, side) {
                score += 2.0;
            }
        }
    }

    score
}

/// Whether the square offset by `(rank_delta, file_delta)` from `from`
/// holds a pawn belonging to `side`.
fn adjacent_is_friendly_pawn(
    position: &Position,
    from: Square,
    rank_delta: i8,
    file_delta: i8,
    side: Side,
) -> bool {
    from.offset(rank_delta, file_delta)
        .and_then(|sq| position.piece_at(sq))
        .is_some_and(|p| p.side == side && p.kind == PieceKind::PAWN)
}

/// The check-pressure term: `1.0` if only the opponent is in check, `0.0`
/// if only `side` is, `0.5` otherwise.
fn check_pressure(position: &Position, side: Side) -> f64 {
    match (position.in_check(side), position.in_check(side.flip())) {
        (true, true) | (false, false) => 0.5,
        (true, false) => 0.0,
        (false, true) => 1.0,
    }
}

/// The disabled-by-default board-coverage term: `side`'s share of the
/// distinct squares either side's pieces pseudo-legally attack or occupy.
fn coverage_share(position: &Position, side: Side) -> f64 {
    let own = distinct_destinations(position, side);
    let opp = distinct_destinations(position, side.flip());
    if own + opp == 0.0 {
        0.0
    } else {
        own / (own + opp)
    }
}

/// The number of distinct destination squares among `side`'s pseudo-legal
/// moves, regardless of whose turn it actually is.
fn distinct_destinations(position: &Position, side: Side) -> f64 {
    let mut seen = std::collections::HashSet::new();
    for action in movegen::generate_pseudo_legal_moves_for(position, side) {
        if let crate::position::Action::Normal { dest, .. } = action {
            seen.insert(dest);
        }
    }
    seen.len() as f64
}
