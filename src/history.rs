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

//! Move-ordering popularity counts, process-wide and never cleared.

use std::collections::HashMap;

use crate::{
    defs::PieceKind,
    position::Action,
};

/// The key a history lookup is hashed on: the moving piece's kind, its
/// origin square, and its destination, all as raw internal coordinates.
///
/// For a castle, the key uses the king's kind with origin and destination
/// being the king's own squares, matching how the source repository
/// collapses a castle into a king move for ordering purposes.
type HistoryKey = (u8, (u8, u8), (u8, u8));

/// Popularity counts for previously chosen [`Action`]s, used to order
/// move generation at each search node.
///
/// Process-wide and owned by [`crate::Engine`]; entries accumulate across
/// the whole match and are never reset.
#[derive(Clone, Debug, Default)]
pub struct HistoryTable {
    counts: HashMap<HistoryKey, u32>,
}

impl HistoryTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Increments the entry for `action`.
    ///
    /// # Panics
    ///
    /// Panics if `action` references a piece not present on `position`.
    pub fn update(&mut self, action: Action, position: &crate::position::Position) {
        let key = Self::key(action, position);
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Returns the stored count for `action`, or `0` if absent.
    ///
    /// # Panics
    ///
    /// Panics if `action` references a piece not present on `position`.
    #[must_use]
    pub fn get(&self, action: Action, position: &crate::position::Position) -> u32 {
        let key = Self::key(action, position);
        self.counts.get(&key).copied().unwrap_or(0)
    }

    fn key(action: Action, position: &crate::position::Position) -> HistoryKey {
        let side = position.side_to_move();
        match action {
            Action::Normal { piece_id, dest } => {
                let piece = position
                    .find_piece(side, piece_id)
                    .expect("history lookup for a piece not on the board");
                (
                    piece.kind.to_index() as u8,
                    (piece.square.rank, piece.square.file),
                    (dest.rank, dest.file),
                )
            }
            Action::Castle {
                king_id, king_dest, ..
            } => {
                let king = position
                    .find_piece(side, king_id)
                    .expect("history lookup for a king not on the board");
                (
                    PieceKind::KING.to_index() as u8,
                    (king.square.rank, king.square.file),
                    (king_dest.rank, king_dest.file),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryTable;
    use crate::{
        defs::{PieceKind, Side, Square},
        position::{Action, Piece, Position},
    };

    fn sample_position() -> Position {
        Position::from_pieces(
            [
                Piece {
                    id: 1,
                    side: Side::WHITE,
                    kind: PieceKind::KING,
                    square: Square::new(0, 4),
                    has_moved: false,
                },
                Piece {
                    id: 2,
                    side: Side::WHITE,
                    kind: PieceKind::ROOK,
                    square: Square::new(0, 0),
                    has_moved: false,
                },
            ],
            Side::WHITE,
            100,
        )
    }

    #[test]
    fn update_increments_and_leaves_other_entries_alone() {
        let position = sample_position();
        let mut table = HistoryTable::new();
        let moved = Action::Normal {
            piece_id: 2,
            dest: Square::new(0, 3),
        };
        let other = Action::Normal {
            piece_id: 1,
            dest: Square::new(1, 4),
        };

        assert_eq!(table.get(moved, &position), 0);
        table.update(moved, &position);
        assert_eq!(table.get(moved, &position), 1);
        assert_eq!(table.get(other, &position), 0);
        table.update(moved, &position);
        assert_eq!(table.get(moved, &position), 2);
    }
}
