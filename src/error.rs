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

use std::fmt::{self, Display, Formatter};

/// An error that occurs when external input cannot be parsed into the
/// position model.
#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ParseError {
    /// A token was outside an expected range, e.g. a rank or file outside
    /// `1..=8`.
    ErroneousToken,
    /// Expected a token but found nothing.
    ExpectedToken,
    /// Found a token, but not one of the expected shape.
    InvalidToken,
}

impl Display for ParseError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::ErroneousToken => "token outside the expected range",
            Self::ExpectedToken => "expected a token but found none",
            Self::InvalidToken => "token was not of the expected shape",
        };
        fmt.write_str(message)
    }
}

impl std::error::Error for ParseError {}

/// An engine-internal error: a board that cannot possibly arise from legal
/// play.
///
/// Per the design, this is a programmer error, not a recoverable condition:
/// the core never attempts to keep running after one of these is detected.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum EngineError {
    /// A side whose king is missing was queried for check, insufficient
    /// material, or similar king-dependent state.
    MissingKing {
        /// The side whose king could not be found.
        side: crate::defs::Side,
    },
    /// A turn was requested on a root position with no legal moves for the
    /// side to move. The host framework's game-over detection should have
    /// ended the match before this is ever reached.
    NoLegalMoves,
    /// The host framework reported a turn context that could not be parsed
    /// into a [`crate::Position`].
    InvalidTurnContext(ParseError),
}

impl Display for EngineError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKing { side } => {
                write!(fmt, "side {} has no king on the board", side.to_index())
            }
            Self::NoLegalMoves => fmt.write_str("root position has no legal moves"),
            Self::InvalidTurnContext(err) => write!(fmt, "invalid turn context: {err}"),
        }
    }
}

impl std::error::Error for EngineError {}
