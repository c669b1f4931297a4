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

//! Legal and pseudo-legal move generation.
//!
//! [`generate_legal_moves`] is what the search drives the tree with.
//! [`generate_pseudo_legal_moves`] is a cheaper, king-safety-blind variant
//! used only by the evaluator's (disabled-by-default) coverage heuristic.

use crate::{
    defs::{PieceKind, Side, Square},
    position::{Action, Piece, Position},
    transposition_table::TranspositionTable,
};

/// The four diagonal ray directions, `(rank delta, file delta)`.
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
/// The four orthogonal ray directions, `(rank delta, file delta)`.
const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
/// The eight knight-move offsets, `(rank delta, file delta)`.
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];
/// All eight squares adjacent to a given square.
const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
];

/// Generates every legal [`Action`] for the side to move.
///
/// Consults `tt`'s move cache whenever the position has no possible
/// castling right for the side to move (checked structurally, not by
/// attempting generation): a castle loses its twin-destination shape under
/// the cache's `(from, to)` pair representation, so any position that
/// could still produce one bypasses the cache entirely and is always
/// freshly generated.
#[must_use]
pub fn generate_legal_moves(position: &Position, tt: &mut TranspositionTable) -> Vec<Action> {
    let castle_possible = might_produce_castle(position);

    if !castle_possible {
        if let Some(cached) = tt.cached_moves(position.fingerprint()) {
            return cached
                .iter()
                .map(|&(from, dest)| {
                    let piece = position
                        .piece_at(from)
                        .expect("cached move references a square with no piece");
                    Action::Normal {
                        piece_id: piece.id,
                        dest,
                    }
                })
                .collect();
        }
    }

    let legal = legal_candidates(position);

    if !castle_possible {
        let side = position.side_to_move();
        let pairs = legal
            .iter()
            .filter_map(|action| match *action {
                Action::Normal { piece_id, dest } => {
                    position.find_piece(side, piece_id).map(|piece| (piece.square, dest))
                }
                Action::Castle { .. } => None,
            })
            .collect();
        tt.store_moves(position.fingerprint(), pairs);
    }

    legal
}

/// Generates pseudo-legal moves for the side to move: no king-safety
/// filter, no castling.
#[must_use]
pub fn generate_pseudo_legal_moves(position: &Position) -> Vec<Action> {
    pseudo_legal_candidates(position, position.side_to_move(), false, true)
}

/// Generates pseudo-legal moves for an arbitrary `side`, regardless of
/// whose turn it actually is: no king-safety filter, no castling, no en
/// passant (which only makes sense relative to the actual side to move).
///
/// Used only by the evaluator's (disabled-by-default) coverage heuristic,
/// which needs a cheap estimate of square control for both sides.
#[must_use]
pub fn generate_pseudo_legal_moves_for(position: &Position, side: Side) -> Vec<Action> {
    pseudo_legal_candidates(position, side, false, false)
}

/// Whether the side to move structurally could still produce a castle:
/// its king has not moved and at least one of its rooks has not moved.
/// A cheap, conservative pre-check used to gate the move cache.
fn might_produce_castle(position: &Position) -> bool {
    let side = position.side_to_move();
    let king_available = position
        .pieces(side)
        .iter()
        .any(|p| p.kind == PieceKind::KING && !p.has_moved);
    let rook_available = position
        .pieces(side)
        .iter()
        .any(|p| p.kind == PieceKind::ROOK && !p.has_moved);
    king_available && rook_available
}

/// Full generation: pseudo-legal candidates (including castling) filtered
/// down to those that do not leave the mover's king in check.
fn legal_candidates(position: &Position) -> Vec<Action> {
    let side = position.side_to_move();
    pseudo_legal_candidates(position, side, true, true)
        .into_iter()
        .filter(|&action| !position.make(action).in_check(side))
        .collect()
}

/// Pseudo-legal candidate generation shared by every entry point above.
fn pseudo_legal_candidates(
    position: &Position,
    side: Side,
    include_castling: bool,
    include_en_passant: bool,
) -> Vec<Action> {
    let mut actions = Vec::new();

    for &piece in position.pieces(side) {
        match piece.kind {
            PieceKind::PAWN => actions.extend(pawn_candidates(position, piece)),
            PieceKind::KNIGHT => actions.extend(step_candidates(position, piece, &KNIGHT_OFFSETS)),
            PieceKind::BISHOP => actions.extend(slide_candidates(position, piece, &DIAGONAL)),
            PieceKind::ROOK => actions.extend(slide_candidates(position, piece, &ORTHOGONAL)),
            PieceKind::QUEEN => {
                actions.extend(slide_candidates(position, piece, &DIAGONAL));
                actions.extend(slide_candidates(position, piece, &ORTHOGONAL));
            }
            PieceKind::KING => actions.extend(step_candidates(position, piece, &KING_OFFSETS)),
            _ => {}
        }
    }

    if include_en_passant && side == position.side_to_move() {
        actions.extend(en_passant_candidates(position));
    }
    if include_castling {
        actions.extend(castling_candidates(position));
    }

    actions
}

/// Candidate destinations for a single step in each of `offsets`, blocked
/// only by a friendly occupant.
fn step_candidates(position: &Position, piece: Piece, offsets: &[(i8, i8)]) -> Vec<Action> {
    offsets
        .iter()
        .filter_map(|&(dr, df)| {
            let dest = piece.square.offset(dr, df)?;
            match position.piece_at(dest) {
                Some(occupant) if occupant.side == piece.side => None,
                _ => Some(Action::Normal { piece_id: piece.id, dest }),
            }
        })
        .collect()
}

/// Candidate destinations along each ray in `directions`, stopping at (and
/// including, iff it holds an enemy) the first occupied square.
fn slide_candidates(position: &Position, piece: Piece, directions: &[(i8, i8)]) -> Vec<Action> {
    let mut actions = Vec::new();
    for &(dr, df) in directions {
        let mut step = 1_i8;
        while let Some(dest) = piece.square.offset(dr * step, df * step) {
            match position.piece_at(dest) {
                None => actions.push(Action::Normal { piece_id: piece.id, dest }),
                Some(occupant) if occupant.side != piece.side => {
                    actions.push(Action::Normal { piece_id: piece.id, dest });
                    break;
                }
                Some(_) => break,
            }
            step += 1;
        }
    }
    actions
}

/// Pawn candidates for one pawn: single push, double push from its start
/// rank, and diagonal captures. En passant is handled separately, since it
/// depends on the position's history rather than just the pawn itself.
fn pawn_candidates(position: &Position, piece: Piece) -> Vec<Action> {
    let dir = piece.side.pawn_direction();
    let mut actions = Vec::new();

    if let Some(one_step) = piece.square.offset(dir, 0) {
        if position.piece_at(one_step).is_none() {
            actions.push(Action::Normal {
                piece_id: piece.id,
                dest: one_step,
            });
            if !piece.has_moved {
                if let Some(two_step) = piece.square.offset(dir * 2, 0) {
                    if position.piece_at(two_step).is_none() {
                        actions.push(Action::Normal {
                            piece_id: piece.id,
                            dest: two_step,
                        });
                    }
                }
            }
        }
    }

    for file_delta in [-1_i8, 1] {
        let Some(dest) = piece.square.offset(dir, file_delta) else {
            continue;
        };
        if let Some(target) = position.piece_at(dest) {
            if target.side != piece.side {
                actions.push(Action::Normal { piece_id: piece.id, dest });
            }
        }
    }

    actions
}

/// En passant candidates: friendly pawns on the landing rank of the most
/// recent action, iff that action was an enemy pawn advancing two ranks.
fn en_passant_candidates(position: &Position) -> Vec<Action> {
    let side = position.side_to_move();
    let Some(&Action::Normal { dest, .. }) = position.last_actions().first() else {
        return Vec::new();
    };
    let Some(&from_rank) = position.last_from_ranks().first() else {
        return Vec::new();
    };
    let Some(moved) = position.piece_at(dest) else {
        return Vec::new();
    };
    if moved.kind != PieceKind::PAWN || moved.side == side {
        return Vec::new();
    }
    if (i16::from(dest.rank) - i16::from(from_rank)).abs() != 2 {
        return Vec::new();
    }

    let mut actions = Vec::new();
    for file_delta in [-1_i8, 1] {
        let Some(attacker_square) = dest.offset(0, file_delta) else {
            continue;
        };
        let Some(attacker) = position.piece_at(attacker_square) else {
            continue;
        };
        if attacker.side != side || attacker.kind != PieceKind::PAWN {
            continue;
        }
        let landing_rank = (i16::from(dest.rank) + i16::from(side.pawn_direction())) as u8;
        actions.push(Action::Normal {
            piece_id: attacker.id,
            dest: Square::new(landing_rank, dest.file),
        });
    }
    actions
}

/// Castling candidates for the side to move: one per unmoved rook whose
/// path to its destination is clear and unattacked.
fn castling_candidates(position: &Position) -> Vec<Action> {
    let side = position.side_to_move();
    let Some(king) = position
        .pieces(side)
        .iter()
        .copied()
        .find(|p| p.kind == PieceKind::KING)
    else {
        return Vec::new();
    };
    if king.has_moved || position.in_check(side) {
        return Vec::new();
    }

    let enemy = side.flip();
    let mut actions = Vec::new();

    for rook in position
        .pieces(side)
        .iter()
        .copied()
        .filter(|p| p.kind == PieceKind::ROOK && !p.has_moved && p.square.rank == king.square.rank)
    {
        let rank = king.square.rank;
        let kingside = rook.square.file > king.square.file;
        let (king_dest_file, rook_dest_file) = if kingside { (6, 5) } else { (2, 3) };

        let (between_lo, between_hi) = if kingside {
            (king.square.file + 1, rook.square.file)
        } else {
            (rook.square.file + 1, king.square.file)
        };
        let between_clear = (between_lo..between_hi)
            .all(|file| position.piece_at(Square::new(rank, file)).is_none());
        if !between_clear {
            continue;
        }

        let (path_lo, path_hi) = if king.square.file <= king_dest_file {
            (king.square.file, king_dest_file)
        } else {
            (king_dest_file, king.square.file)
        };
        let path_safe =
            (path_lo..=path_hi).all(|file| !position.is_square_attacked(Square::new(rank, file), enemy));
        if !path_safe {
            continue;
        }

        actions.push(Action::Castle {
            king_id: king.id,
            king_dest: Square::new(rank, king_dest_file),
            rook_id: rook.id,
            rook_dest: Square::new(rank, rook_dest_file),
        });
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::{generate_legal_moves, generate_pseudo_legal_moves};
    use crate::{
        defs::{PieceKind, Side, Square},
        position::{Action, Piece, Position},
        transposition_table::TranspositionTable,
    };

    fn piece(id: u32, side: Side, kind: PieceKind, square: Square) -> Piece {
        Piece {
            id,
            side,
            kind,
            square,
            has_moved: false,
        }
    }

    #[test]
    fn knight_moves_stay_on_board_and_avoid_friends() {
        let position = Position::from_pieces(
            [
                piece(1, Side::WHITE, PieceKind::KING, Square::new(0, 4)),
                piece(2, Side::BLACK, PieceKind::KING, Square::new(7, 4)),
                piece(3, Side::WHITE, PieceKind::KNIGHT, Square::new(0, 0)),
            ],
            Side::WHITE,
            100,
        );
        let mut tt = TranspositionTable::new();
        let moves = generate_legal_moves(&position, &mut tt);
        let knight_dests: Vec<_> = moves
            .iter()
            .filter_map(|a| match a {
                Action::Normal { piece_id: 3, dest } => Some(*dest),
                _ => None,
            })
            .collect();
        assert_eq!(knight_dests.len(), 2);
        assert!(knight_dests.contains(&Square::new(1, 2)));
        assert!(knight_dests.contains(&Square::new(2, 1)));
    }

    #[test]
    fn rook_ray_stops_at_first_piece() {
        let position = Position::from_pieces(
            [
                piece(1, Side::WHITE, PieceKind::KING, Square::new(0, 4)),
                piece(2, Side::BLACK, PieceKind::KING, Square::new(7, 4)),
                piece(3, Side::WHITE, PieceKind::ROOK, Square::new(0, 0)),
                piece(4, Side::BLACK, PieceKind::PAWN, Square::new(0, 3)),
            ],
            Side::WHITE,
            100,
        );
        let moves = generate_pseudo_legal_moves(&position);
        let rook_dests: Vec<_> = moves
            .iter()
            .filter_map(|a| match a {
                Action::Normal { piece_id: 3, dest } => Some(*dest),
                _ => None,
            })
            .collect();
        assert!(rook_dests.contains(&Square::new(0, 3)));
        assert!(!rook_dests.contains(&Square::new(0, 4)));
    }

    #[test]
    fn castling_is_blocked_by_an_attacker_on_the_path() {
        let base = [
            piece(1, Side::WHITE, PieceKind::KING, Square::new(0, 4)),
            piece(2, Side::BLACK, PieceKind::KING, Square::new(7, 4)),
            piece(3, Side::WHITE, PieceKind::ROOK, Square::new(0, 7)),
        ];

        let clear = Position::from_pieces(base, Side::WHITE, 100);
        let mut tt = TranspositionTable::new();
        let moves = generate_legal_moves(&clear, &mut tt);
        assert!(moves.iter().any(|a| matches!(
            a,
            Action::Castle {
                king_dest,
                rook_dest,
                ..
            } if *king_dest == Square::new(0, 6) && *rook_dest == Square::new(0, 5)
        )));

        let mut with_bishop = base.to_vec();
        with_bishop.push(piece(4, Side::BLACK, PieceKind::BISHOP, Square::new(5, 0))); // a6
        let attacked = Position::from_pieces(with_bishop, Side::WHITE, 100);
        let moves = generate_legal_moves(&attacked, &mut tt);
        assert!(!moves.iter().any(|a| matches!(a, Action::Castle { .. })));
    }

    #[test]
    fn en_passant_is_generated_after_a_double_step() {
        let mut position = Position::from_pieces(
            [
                piece(1, Side::WHITE, PieceKind::KING, Square::new(0, 4)),
                piece(2, Side::BLACK, PieceKind::KING, Square::new(7, 4)),
                piece(3, Side::WHITE, PieceKind::PAWN, Square::new(4, 4)), // e5
                piece(4, Side::BLACK, PieceKind::PAWN, Square::new(6, 3)), // d7
            ],
            Side::BLACK,
            100,
        );
        position = position.make(Action::Normal {
            piece_id: 4,
            dest: Square::new(4, 3), // d5
        });

        let moves = generate_pseudo_legal_moves(&position);
        assert!(moves.iter().any(|a| matches!(
            a,
            Action::Normal { piece_id: 3, dest } if *dest == Square::new(5, 3)
        )));
    }
}
