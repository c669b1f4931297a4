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

//! End-to-end scenarios spanning move generation, evaluation and search
//! together, beyond what each module's own unit tests already cover.

use lazy_static::lazy_static;

use crate::{
    defs::{PieceKind, Side, Square},
    engine::Engine,
    evaluation::StubRng,
    history::HistoryTable,
    movegen,
    position::{Action, Piece, Position},
    search::alpha_beta,
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

struct ScenarioFixture {
    name: &'static str,
    pieces: Vec<Piece>,
    side_to_move: Side,
    stale: u8,
}

lazy_static! {
    /// The hand-built positions behind the scenarios below, declared once
    /// the way Crab's `bench.rs` declares its perft fixture table.
    static ref SCENARIOS: Vec<ScenarioFixture> = vec![
        ScenarioFixture {
            name: "back_rank_mate",
            pieces: vec![
                piece(1, Side::WHITE, PieceKind::KING, Square::new(0, 4)), // e1
                piece(2, Side::WHITE, PieceKind::ROOK, Square::new(0, 0)), // a1
                piece(3, Side::WHITE, PieceKind::ROOK, Square::new(0, 7)), // h1
                piece(4, Side::BLACK, PieceKind::KING, Square::new(7, 4)), // e8
                piece(5, Side::BLACK, PieceKind::ROOK, Square::new(7, 0)), // a8
                piece(6, Side::BLACK, PieceKind::ROOK, Square::new(7, 7)), // h8
                piece(7, Side::BLACK, PieceKind::PAWN, Square::new(6, 0)), // a7
                piece(8, Side::BLACK, PieceKind::PAWN, Square::new(6, 7)), // h7
            ],
            side_to_move: Side::WHITE,
            stale: 100,
        },
        ScenarioFixture {
            name: "castling_base",
            pieces: vec![
                piece(1, Side::WHITE, PieceKind::KING, Square::new(0, 4)), // e1
                piece(2, Side::WHITE, PieceKind::ROOK, Square::new(0, 7)), // h1
                piece(3, Side::BLACK, PieceKind::KING, Square::new(7, 4)), // e8
            ],
            side_to_move: Side::WHITE,
            stale: 100,
        },
        ScenarioFixture {
            name: "en_passant_before",
            pieces: vec![
                piece(1, Side::WHITE, PieceKind::KING, Square::new(0, 4)),
                piece(2, Side::BLACK, PieceKind::KING, Square::new(7, 4)),
                piece(3, Side::WHITE, PieceKind::PAWN, Square::new(4, 4)), // e5
                piece(4, Side::BLACK, PieceKind::PAWN, Square::new(6, 3)), // d7
            ],
            side_to_move: Side::BLACK,
            stale: 100,
        },
        ScenarioFixture {
            name: "promotion",
            pieces: vec![
                piece(1, Side::WHITE, PieceKind::KING, Square::new(0, 4)),
                piece(2, Side::BLACK, PieceKind::KING, Square::new(7, 4)),
                piece(3, Side::WHITE, PieceKind::PAWN, Square::new(6, 4)), // e7
            ],
            side_to_move: Side::WHITE,
            stale: 100,
        },
        ScenarioFixture {
            name: "fifty_move",
            pieces: vec![
                piece(1, Side::WHITE, PieceKind::KING, Square::new(0, 4)),
                piece(2, Side::BLACK, PieceKind::KING, Square::new(7, 4)),
                piece(3, Side::WHITE, PieceKind::ROOK, Square::new(0, 0)),
            ],
            side_to_move: Side::WHITE,
            stale: 1,
        },
    ];
}

/// Looks up a fixture by name and builds its `Position`.
fn scenario(name: &str) -> Position {
    let fixture = SCENARIOS.iter().find(|s| s.name == name).expect("unknown scenario fixture");
    Position::from_pieces(fixture.pieces.clone(), fixture.side_to_move, fixture.stale)
}

/// Looks up a fixture by name and returns its raw piece list, for
/// scenarios that build several variant positions from the same base.
fn scenario_pieces(name: &str) -> Vec<Piece> {
    SCENARIOS
        .iter()
        .find(|s| s.name == name)
        .expect("unknown scenario fixture")
        .pieces
        .clone()
}

#[test]
fn back_rank_mate_in_one_is_generated_and_chosen_by_search() {
    let position = scenario("back_rank_mate");
    let mut tt = TranspositionTable::new();
    let capture_a8 = Action::Normal {
        piece_id: 2,
        dest: Square::new(7, 0),
    };
    assert!(movegen::generate_legal_moves(&position, &mut tt).contains(&capture_a8));

    let weights = crate::evaluation::EvalWeights::default();
    let mut history = HistoryTable::new();
    let (value, best) = alpha_beta::search(
        &position,
        Side::WHITE,
        2,
        1,
        -1.0,
        2.0,
        &weights,
        &mut StubRng,
        &mut tt,
        &mut history,
    );
    assert_eq!(best, Some(capture_a8));
    assert!(value > 0.5, "expected a winning value, got {value}");
}

#[test]
fn castling_is_legal_then_blocked_by_an_attacker_then_blocked_by_a_moved_king() {
    let base = scenario_pieces("castling_base");
    let castle = Action::Castle {
        king_id: 1,
        king_dest: Square::new(0, 6),
        rook_id: 2,
        rook_dest: Square::new(0, 5),
    };

    let legal = Position::from_pieces(base.clone(), Side::WHITE, 100);
    let mut tt = TranspositionTable::new();
    assert!(movegen::generate_legal_moves(&legal, &mut tt).contains(&castle));

    let mut attacked = base.clone();
    attacked.push(piece(4, Side::BLACK, PieceKind::BISHOP, Square::new(5, 0))); // a6, attacks f1
    let attacked = Position::from_pieces(attacked, Side::WHITE, 100);
    let mut tt = TranspositionTable::new();
    assert!(!movegen::generate_legal_moves(&attacked, &mut tt).contains(&castle));

    let mut moved_king = base;
    moved_king[0].has_moved = true;
    let moved_king = Position::from_pieces(moved_king, Side::WHITE, 100);
    let mut tt = TranspositionTable::new();
    assert!(!movegen::generate_legal_moves(&moved_king, &mut tt).contains(&castle));
}

#[test]
fn en_passant_is_generated_after_a_double_step_and_removes_the_victim() {
    let before = scenario("en_passant_before");
    let after_double_step = before.make(Action::Normal {
        piece_id: 4,
        dest: Square::new(4, 3), // d5
    });

    let mut tt = TranspositionTable::new();
    let capture_en_passant = Action::Normal {
        piece_id: 3,
        dest: Square::new(5, 3), // d6
    };
    assert!(movegen::generate_legal_moves(&after_double_step, &mut tt).contains(&capture_en_passant));

    let after_capture = after_double_step.make(capture_en_passant);
    assert!(after_capture.piece_at(Square::new(4, 3)).is_none());
}

#[test]
fn promotion_is_generated_and_becomes_a_queen() {
    let position = scenario("promotion");
    let mut tt = TranspositionTable::new();
    let promote = Action::Normal {
        piece_id: 3,
        dest: Square::new(7, 4), // e8
    };
    assert!(movegen::generate_legal_moves(&position, &mut tt).contains(&promote));

    let after = position.make(promote);
    assert_eq!(after.piece_at(Square::new(7, 4)).unwrap().kind, PieceKind::QUEEN);
    assert!(!after.quiet());
}

#[test]
fn fifty_move_counter_reaching_zero_is_a_terminal_draw() {
    let position = scenario("fifty_move");
    assert!(position.terminal().is_none());

    let after = position.make(Action::Normal {
        piece_id: 1,
        dest: Square::new(0, 3),
    });
    assert_eq!(after.stale(), 0);
    assert_eq!(after.terminal(), Some(0.5));
}

/// A standard chess starting position, wrapped in the host-framework
/// transport traits, for the turn driver's time-guard scenario.
mod starting_position {
    use crate::transport::{MoveRecord, PieceHandle, PlayerInfo, TurnContext};

    #[derive(Clone)]
    pub struct StubPiece {
        pub id: u32,
        pub owner: u8,
        pub rank: u8,
        pub file: u8,
        pub kind: u8,
        pub has_moved: bool,
    }

    impl PieceHandle for StubPiece {
        fn id(&self) -> u32 {
            self.id
        }
        fn owner(&self) -> u8 {
            self.owner
        }
        fn rank(&self) -> u8 {
            self.rank
        }
        fn file(&self) -> u8 {
            self.file
        }
        fn kind(&self) -> u8 {
            self.kind
        }
        fn has_moved(&self) -> bool {
            self.has_moved
        }
        fn submit_move(&self, _file: u8, _rank: u8, _promotion: char) {}
    }

    pub struct StubMove;

    impl MoveRecord for StubMove {
        fn from_rank(&self) -> u8 {
            1
        }
        fn from_file(&self) -> u8 {
            1
        }
        fn to_rank(&self) -> u8 {
            1
        }
        fn to_file(&self) -> u8 {
            1
        }
    }

    pub struct StubPlayer {
        pub id: u32,
        pub remaining_clock: f64,
    }

    impl PlayerInfo for StubPlayer {
        fn id(&self) -> u32 {
            self.id
        }
        fn remaining_clock(&self) -> f64 {
            self.remaining_clock
        }
    }

    pub struct StubContext {
        pub own: Vec<StubPiece>,
        pub opponent: Vec<StubPiece>,
        pub clock: f64,
    }

    impl TurnContext for StubContext {
        type Piece = StubPiece;
        type Move = StubMove;
        type Player = StubPlayer;

        fn own_pieces(&self) -> impl Iterator<Item = Self::Piece> {
            self.own.iter().cloned()
        }
        fn opponent_pieces(&self) -> impl Iterator<Item = Self::Piece> {
            self.opponent.iter().cloned()
        }
        fn players(&self) -> impl Iterator<Item = Self::Player> {
            vec![
                StubPlayer {
                    id: 0,
                    remaining_clock: self.clock,
                },
                StubPlayer {
                    id: 1,
                    remaining_clock: self.clock,
                },
            ]
            .into_iter()
        }
        fn acting_player_id(&self) -> u32 {
            0
        }
        fn stale_counter(&self) -> u8 {
            100
        }
        fn recent_moves(&self) -> impl Iterator<Item = Self::Move> {
            std::iter::empty()
        }
        fn plies_played(&self) -> u32 {
            0
        }
    }

    /// Builds one side's back rank plus pawn row for the standard setup.
    fn back_rank_and_pawns(owner: u8, back_rank: u8, pawn_rank: u8, id_offset: u32) -> Vec<StubPiece> {
        const BACK_RANK_KINDS: [char; 8] = ['R', 'N', 'B', 'Q', 'K', 'B', 'N', 'R'];
        let mut pieces = Vec::with_capacity(16);
        for (file, &kind) in BACK_RANK_KINDS.iter().enumerate() {
            pieces.push(StubPiece {
                id: id_offset + file as u32,
                owner,
                rank: back_rank,
                file: file as u8 + 1,
                kind: kind as u8,
                has_moved: false,
            });
        }
        for file in 0..8 {
            pieces.push(StubPiece {
                id: id_offset + 8 + file as u32,
                owner,
                rank: pawn_rank,
                file: file + 1,
                kind: b'P',
                has_moved: false,
            });
        }
        pieces
    }

    pub fn stub_context(clock: f64) -> StubContext {
        StubContext {
            own: back_rank_and_pawns(0, 1, 2, 1),
            opponent: back_rank_and_pawns(1, 8, 7, 100),
            clock,
        }
    }
}

#[test]
fn iterative_deepening_still_submits_one_move_under_a_tiny_time_budget() {
    let ctx = starting_position::stub_context(0.01);
    let legal_at_root = {
        let root = Position::from_turn_context(&ctx).expect("valid starting position");
        let mut tt = TranspositionTable::new();
        movegen::generate_legal_moves(&root, &mut tt).len()
    };
    assert!(legal_at_root >= 20, "expected a standard opening branching factor");

    let mut engine = Engine::with_rng(StubRng);
    engine.take_turn(&ctx).expect("a legal move exists");
}

#[test]
fn from_turn_context_rejects_a_context_reporting_no_pieces_at_all() {
    let ctx = starting_position::StubContext {
        own: Vec::new(),
        opponent: Vec::new(),
        clock: 60.0,
    };
    assert_eq!(
        Position::from_turn_context(&ctx).unwrap_err(),
        crate::error::ParseError::ExpectedToken
    );
}
