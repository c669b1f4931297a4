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

//! Iterative-deepening alpha-beta search.
//!
//! [`alpha_beta`] holds the two recursive primitives; [`iterative_deepening`]
//! drives them through the per-turn depth schedule; [`time`] sizes a turn's
//! budget and decides when to stop deepening.

pub mod alpha_beta;
pub mod iterative_deepening;
pub mod time;
