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

//! Three caches keyed by [`Fingerprint`], process-wide for the life of a
//! match and never cleared.
//!
//! Unlike a fixed-size replacement-scheme table, this grows without bound:
//! the source repository attaches these caches to the position type as
//! ambient state for exactly one game's lifetime, and a game is short
//! enough that unbounded growth is an accepted trade, not a leak.

use std::collections::HashMap;

use crate::{defs::Square, position::Fingerprint};

/// Move cache, evaluation cache, and check cache, all keyed by
/// [`Fingerprint`].
#[derive(Default)]
pub struct TranspositionTable {
    moves: HashMap<Fingerprint, Vec<(Square, Square)>>,
    evaluations: HashMap<Fingerprint, f64>,
    checks: HashMap<Fingerprint, (bool, bool)>,
}

impl TranspositionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            moves: HashMap::new(),
            evaluations: HashMap::new(),
            checks: HashMap::new(),
        }
    }

    /// Looks up a previously cached move list.
    ///
    /// Castle actions are never represented here (they lose their
    /// twin-destination structure under the `(from, to)` pair
    /// representation); callers must skip this cache entirely whenever a
    /// castle might be produced and regenerate instead.
    #[must_use]
    pub fn cached_moves(&self, fingerprint: Fingerprint) -> Option<&[(Square, Square)]> {
        self.moves.get(&fingerprint).map(Vec::as_slice)
    }

    /// Stores a move list for `fingerprint`, overwriting any previous entry.
    pub fn store_moves(&mut self, fingerprint: Fingerprint, moves: Vec<(Square, Square)>) {
        self.moves.insert(fingerprint, moves);
    }

    /// Looks up a previously cached evaluation.
    #[must_use]
    pub fn cached_evaluation(&self, fingerprint: Fingerprint) -> Option<f64> {
        self.evaluations.get(&fingerprint).copied()
    }

    /// Stores the evaluator's result for `fingerprint`.
    pub fn store_evaluation(&mut self, fingerprint: Fingerprint, value: f64) {
        self.evaluations.insert(fingerprint, value);
    }

    /// Looks up previously cached in-check flags, `(white, black)`.
    ///
    /// Reserved: nothing in this crate populates this cache yet.
    #[must_use]
    pub fn cached_checks(&self, fingerprint: Fingerprint) -> Option<(bool, bool)> {
        self.checks.get(&fingerprint).copied()
    }

    /// Stores in-check flags, `(white, black)`, for `fingerprint`.
    pub fn store_checks(&mut self, fingerprint: Fingerprint, flags: (bool, bool)) {
        self.checks.insert(fingerprint, flags);
    }
}
