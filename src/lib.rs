// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! Spell Chess rules engine.
//!
//! A deterministic, side-effect-free state machine that computes legal
//! actions, mutates position state, generates notations, detects
//! termination, and reconstructs a game from a flat compact action log.
//! Persistence, transport, and UI are external collaborators; this crate
//! has no I/O, no clock reads, and no randomness.
//!
//! Key abstractions:
//!
//! * `GameState` is the aggregate: board, turn counters, spell charges,
//!   active spell effects, move log, and repetition bookkeeping. It is
//!   produced by `GameState::initial()` and transformed by `apply_move`,
//!   `apply_promotion`, `apply_resign`, and `apply_spell`, each of which
//!   returns a new state rather than mutating in place.
//! * `Piece` carries a stable `PieceId` so that Jump and Freeze spells can
//!   target a specific piece rather than a square, surviving any number of
//!   subsequent moves.
//! * `replay` reconstructs a `GameState` from the flat compact action log
//!   that is the engine's sole externally-persisted source of truth;
//!   `build_compact_log` is its inverse.

mod engine;

pub use engine::*;
