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

//! The two recursive primitives the iterative-deepening driver calls: a
//! plain depth-bounded alpha-beta ([`search_unordered`]), used for the
//! unconditional depth-1 pass, and a history-ordered alpha-beta with a
//! quiescence extension ([`search`]), used for every pass after it.

use crate::{
    defs::Side,
    evaluation::{self, EvalWeights, RngSource},
    history::HistoryTable,
    movegen,
    position::{Action, Position},
    transposition_table::TranspositionTable,
};

/// Evaluates `position` and `maximizer`'s legal-move emptiness, matching
/// the checkmate/stalemate branch both search variants share: no legal
/// moves and in check is a win for whichever side isn't stuck, no legal
/// moves and not in check is a draw.
fn terminal_without_moves(position: &Position, maximizer: Side) -> (f64, Option<Action>) {
    let mover = position.side_to_move();
    if position.in_check(mover) {
        if maximizer == mover {
            (0.0, None)
        } else {
            (1.0, None)
        }
    } else {
        (0.5, None)
    }
}

/// Plain alpha-beta to a fixed `depth`, no move ordering, no quiescence
/// extension: the unconditional first iterative-deepening pass, which must
/// return a legal move regardless of how little time is left.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn search_unordered(
    position: &Position,
    maximizer: Side,
    depth: i32,
    alpha: f64,
    beta: f64,
    weights: &EvalWeights,
    rng: &mut impl RngSource,
    tt: &mut TranspositionTable,
) -> (f64, Option<Action>) {
    if let Some(terminal) = position.terminal() {
        return (terminal, None);
    }
    if depth <= 0 {
        return (evaluation::evaluate(position, maximizer, weights, rng, tt), None);
    }

    let legal = movegen::generate_legal_moves(position, tt);
    if legal.is_empty() {
        return terminal_without_moves(position, maximizer);
    }

    let maximizing = maximizer == position.side_to_move();
    let mut alpha = alpha;
    let mut beta = beta;
    let mut best_value = if maximizing { -1.0 } else { 2.0 };
    let mut best_action = None;

    for action in legal {
        let child = position.make(action);
        let (value, _) = search_unordered(&child, maximizer, depth - 1, alpha, beta, weights, rng, tt);

        if maximizing {
            if value > best_value {
                best_value = value;
                best_action = Some(action);
            }
            if beta <= value {
                break;
            }
            if value > alpha {
                alpha = value;
            }
        } else {
            if value < best_value {
                best_value = value;
                best_action = Some(action);
            }
            if value <= alpha {
                break;
            }
            if value < beta {
                beta = value;
            }
        }
    }

    (best_value, best_action)
}

/// History-ordered alpha-beta with a quiescence extension.
///
/// Descends while `extension > 0` and either `depth > 0` or the position
/// is not quiet, matching the source repository's early-termination rule
/// verbatim; a capture or promotion at the depth horizon keeps consuming
/// `extension` rather than stopping mid-exchange.
///
/// # Tie-breaking
///
/// The source repository breaks ties among equal-valued children by
/// comparing `(value, chosen_grandchild_action)` against the running best
/// `(value, this_node's_candidate_action)` — a lexicographic fallback that
/// only matters on an exact float tie, and one its own `Action` type has
/// no ordering for. Since Rust's `Action` has no natural order either,
/// ties here keep whichever candidate was seen first (a strict `>`/`<`
/// comparison on `value` alone): deterministic, and identical to the
/// source's behaviour on every non-tied comparison.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn search(
    position: &Position,
    maximizer: Side,
    depth: i32,
    extension: i32,
    alpha: f64,
    beta: f64,
    weights: &EvalWeights,
    rng: &mut impl RngSource,
    tt: &mut TranspositionTable,
    history: &mut HistoryTable,
) -> (f64, Option<Action>) {
    if let Some(terminal) = position.terminal() {
        return (terminal, None);
    }
    if !((depth > 0 || !position.quiet()) && extension > 0) {
        return (evaluation::evaluate(position, maximizer, weights, rng, tt), None);
    }

    let mut legal = movegen::generate_legal_moves(position, tt);
    if legal.is_empty() {
        return terminal_without_moves(position, maximizer);
    }
    legal.sort_by(|a, b| history.get(*b, position).cmp(&history.get(*a, position)));

    let (child_depth, child_extension) = if depth > 0 {
        (depth - 1, extension)
    } else {
        (0, extension - 1)
    };

    let maximizing = maximizer == position.side_to_move();
    let mut alpha = alpha;
    let mut beta = beta;
    let mut best_value = if maximizing { -1.0 } else { 2.0 };
    let mut best_action = None;

    for action in legal {
        let child = position.make(action);
        let (value, _) = search(
            &child,
            maximizer,
            child_depth,
            child_extension,
            alpha,
            beta,
            weights,
            rng,
            tt,
            history,
        );

        if maximizing {
            if value > best_value {
                best_value = value;
                best_action = Some(action);
            }
            if beta <= value {
                break;
            }
            if value > alpha {
                alpha = value;
            }
        } else {
            if value < best_value {
                best_value = value;
                best_action = Some(action);
            }
            if value <= alpha {
                break;
            }
            if value < beta {
                beta = value;
            }
        }
    }

    if let Some(action) = best_action {
        history.update(action, position);
    }

    (best_value, best_action)
}

#[cfg(test)]
mod tests {
    use super::{search, search_unordered};
    use crate::{
        defs::{PieceKind, Side, Square},
        evaluation::{EvalWeights, StubRng},
        history::HistoryTable,
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
    fn search_finds_back_rank_mate_in_one() {
        // White king b2, rook a1; Black king h8 boxed in by its own pawns
        // on f7, g7, h7. Ra1-a8 is mate: rank 8 is otherwise empty.
        let position = Position::from_pieces(
            [
                piece(1, Side::WHITE, PieceKind::KING, Square::new(1, 1)), // b2
                piece(2, Side::WHITE, PieceKind::ROOK, Square::new(0, 0)), // a1
                piece(3, Side::BLACK, PieceKind::KING, Square::new(7, 7)), // h8
                piece(4, Side::BLACK, PieceKind::PAWN, Square::new(6, 5)), // f7
                piece(5, Side::BLACK, PieceKind::PAWN, Square::new(6, 6)), // g7
                piece(6, Side::BLACK, PieceKind::PAWN, Square::new(6, 7)), // h7
            ],
            Side::WHITE,
            100,
        );
        let weights = EvalWeights::default();
        let mut rng = StubRng;
        let mut tt = TranspositionTable::new();
        let mut history = HistoryTable::new();

        let (value, action) = search(
            &position,
            Side::WHITE,
            2,
            3,
            -1.0,
            2.0,
            &weights,
            &mut rng,
            &mut tt,
            &mut history,
        );

        assert_eq!(value, 1.0);
        assert_eq!(
            action,
            Some(Action::Normal {
                piece_id: 2,
                dest: Square::new(7, 0),
            })
        );
    }

    #[test]
    fn search_unordered_returns_a_legal_move_at_depth_one() {
        let position = Position::from_pieces(
            [
                piece(1, Side::WHITE, PieceKind::KING, Square::new(0, 4)),
                piece(2, Side::BLACK, PieceKind::KING, Square::new(7, 4)),
                piece(3, Side::WHITE, PieceKind::ROOK, Square::new(0, 0)),
            ],
            Side::WHITE,
            100,
        );
        let weights = EvalWeights::default();
        let mut rng = StubRng;
        let mut tt = TranspositionTable::new();

        let (_, action) =
            search_unordered(&position, Side::WHITE, 1, -1.0, 2.0, &weights, &mut rng, &mut tt);

        assert!(matches!(action, Some(Action::Normal { .. })));
    }
}
