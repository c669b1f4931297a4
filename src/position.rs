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

use arrayvec::ArrayVec;

use crate::{
    defs::{PieceKind, Side, Square},
    error::{EngineError, ParseError},
    transport::TurnContext,
};

/// The maximum number of pieces a side can ever have on the board.
const MAX_PIECES_PER_SIDE: usize = 16;
/// The bound on recorded history: "at most the last nine Actions played".
const MAX_HISTORY: usize = 9;

/// A single chess piece.
///
/// Copying a [`Piece`] is cheap and expected during move simulation: it is a
/// value record, not a handle into shared state.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Piece {
    /// A stable identity carried over from the external world.
    pub id: u32,
    /// Which side the piece belongs to.
    pub side: Side,
    /// The kind of piece. Mutable only via promotion.
    pub kind: PieceKind,
    /// Where the piece currently sits.
    pub square: Square,
    /// Whether the piece has ever moved, relevant to castling and the
    /// pawn's double-step.
    pub has_moved: bool,
}

/// A move description.
///
/// # Equality
///
/// Two [`Action`]s are equal iff both are [`Action::Normal`] and agree on
/// the moving piece's identity and destination. [`Action::Castle`] is never
/// equal to anything, including another castle: this asymmetry is
/// deliberate (see [`Position::terminal`]'s repetition test) and means
/// `Action`'s [`PartialEq`] is not reflexive. `Action` therefore does not
/// implement [`Eq`].
#[derive(Clone, Copy, Debug)]
pub enum Action {
    /// An ordinary move, capture, en passant capture, or promotion (always
    /// to a queen; see the crate's external interfaces).
    Normal {
        /// The identity of the piece being moved.
        piece_id: u32,
        /// Where it ends up.
        dest: Square,
    },
    /// A castling move: the king and rook move together, with no capture.
    Castle {
        /// Identity of the castling king.
        king_id: u32,
        /// Where the king ends up.
        king_dest: Square,
        /// Identity of the castling rook.
        rook_id: u32,
        /// Where the rook ends up.
        rook_dest: Square,
    },
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Normal { piece_id, dest },
                Self::Normal {
                    piece_id: other_id,
                    dest: other_dest,
                },
            ) => piece_id == other_id && dest == other_dest,
            _ => false,
        }
    }
}

/// An immutable-by-convention snapshot of a chess board.
///
/// `Position` is a small value type (an 8x8 grid plus two bounded piece
/// lists) and is cheap to copy; [`Position::make`] returns a new snapshot
/// rather than mutating in place, which lets the recursive search keep
/// ancestor positions alive on the call stack without any explicit
/// unmake step.
#[derive(Clone, Copy, Debug)]
pub struct Position {
    grid: [[Option<Piece>; 8]; 8],
    pieces: [ArrayVec<Piece, MAX_PIECES_PER_SIDE>; Side::TOTAL],
    side_to_move: Side,
    /// Countdown, in plies, to a fifty-move-equivalent draw. Starts at 100
    /// and resets to 100 on any pawn move or capture.
    stale: u8,
    /// The last nine [`Action`]s played, most recent first.
    last_actions: ArrayVec<Action, MAX_HISTORY>,
    /// The from-rank of each of `last_actions`, needed for en passant.
    last_from_ranks: ArrayVec<u8, MAX_HISTORY>,
    /// `true` unless the last transition was a capture, promotion, or
    /// castle.
    quiet: bool,
}

/// A compact key for the transposition cache: the side to move followed by
/// the occupancy of all 64 squares.
///
/// Deliberately ignores has-moved flags, en passant context, the stale
/// counter, and move history: collisions on those fields are an accepted
/// trade for a small key (see [`crate::transposition_table`]).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct Fingerprint([u8; 65]);

impl Position {
    /// Builds a position directly from a set of pieces, skipping the
    /// external-transport boundary. Used by tests and by
    /// [`Self::from_turn_context`].
    #[must_use]
    pub fn from_pieces(pieces: impl IntoIterator<Item = Piece>, side_to_move: Side, stale: u8) -> Self {
        let mut grid = [[None; 8]; 8];
        let mut lists: [ArrayVec<Piece, MAX_PIECES_PER_SIDE>; Side::TOTAL] =
            [ArrayVec::new(), ArrayVec::new()];

        for piece in pieces {
            grid[piece.square.rank as usize][piece.square.file as usize] = Some(piece);
            lists[piece.side.to_index()]
                .try_push(piece)
                .expect("more than 16 pieces for one side");
        }

        Self {
            grid,
            pieces: lists,
            side_to_move,
            stale,
            last_actions: ArrayVec::new(),
            last_from_ranks: ArrayVec::new(),
            quiet: true,
        }
    }

    /// Builds a [`Position`] from the host framework's current turn
    /// context (see [`crate::transport`]).
    pub fn from_turn_context<T: TurnContext>(ctx: &T) -> Result<Self, ParseError> {
        let acting_side = Side(u8::try_from(ctx.acting_player_id()).map_err(|_| ParseError::ErroneousToken)?);

        let mut position = {
            let mut pieces = Vec::with_capacity(MAX_PIECES_PER_SIDE * Side::TOTAL);
            for handle in ctx.own_pieces().chain(ctx.opponent_pieces()) {
                let square = Square::from_external(handle.rank(), handle.file())?;
                let kind = PieceKind::try_from(handle.kind() as char)?;
                pieces.push(Piece {
                    id: handle.id(),
                    side: Side(handle.owner()),
                    kind,
                    square,
                    has_moved: handle.has_moved(),
                });
            }
            if pieces.is_empty() {
                return Err(ParseError::ExpectedToken);
            }
            Self::from_pieces(pieces, acting_side, ctx.stale_counter())
        };

        // The history as reported by the server is reconstructed the same
        // way the moving piece's own identity is recovered: by looking up
        // whatever piece now occupies the move's destination square. This
        // cannot represent a castle (it always yields a `Normal` shape),
        // matching how the host framework reports move history.
        for record in ctx.recent_moves().take(MAX_HISTORY) {
            let from = Square::from_external(record.from_rank(), record.from_file())?;
            let dest = Square::from_external(record.to_rank(), record.to_file())?;
            let Some(piece) = position.piece_at(dest) else {
                continue;
            };
            position.last_actions.push(Action::Normal {
                piece_id: piece.id,
                dest,
            });
            position.last_from_ranks.push(from.rank);
        }

        Ok(position)
    }

    /// The piece occupying `square`, if any.
    #[must_use]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.grid[square.rank as usize][square.file as usize]
    }

    /// The live pieces belonging to `side`.
    #[must_use]
    pub fn pieces(&self, side: Side) -> &[Piece] {
        &self.pieces[side.to_index()]
    }

    /// The side to move.
    #[must_use]
    pub const fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// The fifty-move-equivalent countdown, in plies.
    #[must_use]
    pub const fn stale(&self) -> u8 {
        self.stale
    }

    /// Whether the position is "quiet": the last transition was not a
    /// capture, promotion, or castle.
    #[must_use]
    pub const fn quiet(&self) -> bool {
        self.quiet
    }

    /// The last nine actions played, most recent first.
    #[must_use]
    pub fn last_actions(&self) -> &[Action] {
        &self.last_actions
    }

    /// The from-rank of each of [`Self::last_actions`].
    #[must_use]
    pub fn last_from_ranks(&self) -> &[u8] {
        &self.last_from_ranks
    }

    /// Finds a piece of `side` by its stable identity.
    #[must_use]
    pub fn find_piece(&self, side: Side, id: u32) -> Option<Piece> {
        self.pieces[side.to_index()].iter().copied().find(|p| p.id == id)
    }

    /// Locates `side`'s king, if it has one.
    #[must_use]
    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.pieces[side.to_index()]
            .iter()
            .find(|p| p.kind == PieceKind::KING)
            .map(|p| p.square)
    }

    fn set_square(&mut self, square: Square, piece: Option<Piece>) {
        self.grid[square.rank as usize][square.file as usize] = piece;
    }

    fn remove_from_list(&mut self, side: Side, id: u32) {
        self.pieces[side.to_index()].retain(|p| p.id != id);
    }

    fn upsert_in_list(&mut self, piece: Piece) {
        let list = &mut self.pieces[piece.side.to_index()];
        if let Some(slot) = list.iter_mut().find(|p| p.id == piece.id) {
            *slot = piece;
        } else {
            list.try_push(piece).expect("more than 16 pieces for one side");
        }
    }

    /// Returns a new [`Position`] with `action` applied.
    ///
    /// `self` remains valid and unmodified: the caller's ancestor position
    /// is untouched, which is what lets the recursive search keep parent
    /// positions on the stack.
    ///
    /// # Panics
    ///
    /// Panics if `action` references a piece that is not on the board of
    /// the side to move. The generator never produces such an action.
    #[must_use]
    pub fn make(&self, action: Action) -> Self {
        let mover_side = self.side_to_move;
        let mut next = *self;

        let (is_capture, is_promotion, is_castle, mover_origin_rank) = match action {
            Action::Normal { piece_id, dest } => {
                let mover = self
                    .find_piece(mover_side, piece_id)
                    .expect("action references a piece not on the board");
                let from = mover.square;
                let is_pawn = mover.kind == PieceKind::PAWN;

                let is_en_passant =
                    is_pawn && from.file != dest.file && self.piece_at(dest).is_none();
                let victim_square = if is_en_passant {
                    Square::new(from.rank, dest.file)
                } else {
                    dest
                };
                let captured = if is_en_passant {
                    self.piece_at(victim_square)
                } else {
                    self.piece_at(dest)
                };

                next.set_square(from, None);
                if is_en_passant {
                    next.set_square(victim_square, None);
                }
                if let Some(victim) = captured {
                    next.remove_from_list(victim.side, victim.id);
                }

                let is_promotion = is_pawn && dest.rank == mover_side.promotion_rank();
                let mut moved = mover;
                moved.square = dest;
                moved.has_moved = true;
                if is_promotion {
                    moved.kind = PieceKind::QUEEN;
                }
                next.set_square(dest, Some(moved));
                next.upsert_in_list(moved);

                (captured.is_some(), is_promotion, false, from.rank)
            }
            Action::Castle {
                king_id,
                king_dest,
                rook_id,
                rook_dest,
            } => {
                let king = self
                    .find_piece(mover_side, king_id)
                    .expect("castle references a king not on the board");
                let rook = self
                    .find_piece(mover_side, rook_id)
                    .expect("castle references a rook not on the board");

                next.set_square(king.square, None);
                next.set_square(rook.square, None);

                let mut new_king = king;
                new_king.square = king_dest;
                new_king.has_moved = true;
                let mut new_rook = rook;
                new_rook.square = rook_dest;
                new_rook.has_moved = true;

                next.set_square(king_dest, Some(new_king));
                next.set_square(rook_dest, Some(new_rook));
                next.upsert_in_list(new_king);
                next.upsert_in_list(new_rook);

                (false, false, true, king.square.rank)
            }
        };

        let is_pawn_move = matches!(action, Action::Normal { piece_id, .. }
            if self.find_piece(mover_side, piece_id).is_some_and(|p| p.kind == PieceKind::PAWN));

        next.side_to_move = mover_side.flip();
        next.stale = if is_pawn_move || is_capture {
            100
        } else {
            self.stale.saturating_sub(1)
        };
        next.quiet = !(is_capture || is_promotion || is_castle);
        next.last_actions = prepend_bounded(&self.last_actions, action);
        next.last_from_ranks = prepend_bounded(&self.last_from_ranks, mover_origin_rank);

        next
    }

    /// Whether `square` is attacked by any piece of `by_side`.
    ///
    /// Probes outward from `square`: sliding attackers along the eight
    /// rays (stopping at the first piece encountered on each), the eight
    /// knight offsets, the two pawn-attack squares for `by_side`'s pawn
    /// direction, and the eight king-adjacent squares.
    #[must_use]
    pub fn is_square_attacked(&self, square: Square, by_side: Side) -> bool {
        const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
        const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
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

        for &(dr, df) in &DIAGONAL {
            if self.ray_hits(square, dr, df, by_side, &[PieceKind::BISHOP, PieceKind::QUEEN]) {
                return true;
            }
        }
        for &(dr, df) in &ORTHOGONAL {
            if self.ray_hits(square, dr, df, by_side, &[PieceKind::ROOK, PieceKind::QUEEN]) {
                return true;
            }
        }
        for &(dr, df) in &KNIGHT_OFFSETS {
            if self.occupied_by(square, dr, df, by_side, PieceKind::KNIGHT) {
                return true;
            }
        }
        for &(dr, df) in DIAGONAL.iter().chain(ORTHOGONAL.iter()) {
            if self.occupied_by(square, dr, df, by_side, PieceKind::KING) {
                return true;
            }
        }

        let dir = by_side.pawn_direction();
        for file_delta in [-1, 1] {
            if self.occupied_by(square, -dir, file_delta, by_side, PieceKind::PAWN) {
                return true;
            }
        }

        false
    }

    fn ray_hits(&self, from: Square, dr: i8, df: i8, by_side: Side, kinds: &[PieceKind]) -> bool {
        let mut step = 1_i8;
        while let Some(sq) = from.offset(dr * step, df * step) {
            if let Some(piece) = self.piece_at(sq) {
                return piece.side == by_side && kinds.contains(&piece.kind);
            }
            step += 1;
        }
        false
    }

    fn occupied_by(&self, from: Square, dr: i8, df: i8, by_side: Side, kind: PieceKind) -> bool {
        from.offset(dr, df)
            .and_then(|sq| self.piece_at(sq))
            .is_some_and(|p| p.side == by_side && p.kind == kind)
    }

    /// Whether `side` is currently in check.
    ///
    /// # Panics
    ///
    /// Panics if `side` has no king on the board: per the design, this is
    /// an impossible board and a programmer error, not a recoverable
    /// condition.
    #[must_use]
    pub fn in_check(&self, side: Side) -> bool {
        let king_square = self
            .king_square(side)
            .unwrap_or_else(|| panic!("{}", EngineError::MissingKing { side }));
        self.is_square_attacked(king_square, side.flip())
    }

    /// Tests the stalemate/material/repetition terminal predicate,
    /// independent of move availability.
    ///
    /// Returns `Some(0.5)` (a draw) for the stale counter reaching zero,
    /// for the four-action repetition proxy, or for insufficient material;
    /// `None` otherwise. Checkmate and "no legal moves" stalemate are
    /// handled by the search where the legal-move list comes up empty, not
    /// here.
    #[must_use]
    pub fn terminal(&self) -> Option<f64> {
        if self.stale == 0 {
            return Some(0.5);
        }

        if self.last_actions.len() >= 8
            && (0..4).all(|i| self.last_actions[i] == self.last_actions[i + 4])
        {
            return Some(0.5);
        }

        if self.is_insufficient_material() {
            return Some(0.5);
        }

        None
    }

    fn is_insufficient_material(&self) -> bool {
        let mut rpq_count = 0_u32;
        let mut knight_count = 0_u32;
        let mut bishop_complex = [[0_u32; 2]; Side::TOTAL];

        for side in [Side::WHITE, Side::BLACK] {
            for piece in &self.pieces[side.to_index()] {
                match piece.kind {
                    PieceKind::PAWN | PieceKind::ROOK | PieceKind::QUEEN => rpq_count += 1,
                    PieceKind::KNIGHT => knight_count += 1,
                    PieceKind::BISHOP => {
                        let complex = (piece.square.rank as usize + piece.square.file as usize) % 2;
                        bishop_complex[side.to_index()][complex] += 1;
                    }
                    _ => {}
                }
            }
        }

        if rpq_count > 0 || knight_count > 1 {
            return false;
        }
        let total_bishops: u32 = bishop_complex.iter().flatten().sum();
        if knight_count > 0 && total_bishops > 0 {
            return false;
        }

        let white = bishop_complex[Side::WHITE.to_index()];
        let black = bishop_complex[Side::BLACK.to_index()];
        if (white[0] > 0 && black[1] > 0) || (white[1] > 0 && black[0] > 0) {
            return false;
        }

        true
    }

    /// The compact transposition-cache key for this position.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut bytes = [b' '; 65];
        bytes[0] = b'0' + self.side_to_move.0;
        for rank in 0..8 {
            for file in 0..8 {
                let code = self.grid[rank][file].map_or(b' ', |p| {
                    let letter: char = p.kind.into();
                    if p.side == Side::WHITE {
                        letter as u8
                    } else {
                        letter.to_ascii_lowercase() as u8
                    }
                });
                bytes[1 + rank * 8 + file] = code;
            }
        }
        Fingerprint(bytes)
    }
}

/// Builds a new bounded list with `item` at the front, followed by as much
/// of `old` as fits.
fn prepend_bounded<T: Copy, const N: usize>(old: &ArrayVec<T, N>, item: T) -> ArrayVec<T, N> {
    let mut next = ArrayVec::new();
    next.push(item);
    for &existing in old.iter().take(N - 1) {
        next.push(existing);
    }
    next
}
