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

//! Spell charges, cooldowns, and the active-spell lifecycle (component 4.4).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum_macros::{Display, EnumIter};

use super::coord::Square;
use super::material::PieceId;

pub const JUMP_STARTING_CHARGES: u8 = 2;
pub const FREEZE_STARTING_CHARGES: u8 = 5;
pub const SPELL_COOLDOWN_TURNS: u32 = 3;
pub const SPELL_DURATION_PLIES: u32 = 2;

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum SpellKind {
    Jump,
    Freeze,
}

/// Per-color spell charges and cooldown markers, one half via `Pair`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SpellState {
    pub jump_left: u8,
    pub freeze_left: u8,
    pub jump_last_used_turn: u32,
    pub freeze_last_used_turn: u32,
}

impl Default for SpellState {
    fn default() -> Self {
        Self {
            jump_left: JUMP_STARTING_CHARGES,
            freeze_left: FREEZE_STARTING_CHARGES,
            jump_last_used_turn: 0,
            freeze_last_used_turn: 0,
        }
    }
}

impl SpellState {
    fn charges(&self, kind: SpellKind) -> u8 {
        match kind {
            SpellKind::Jump => self.jump_left,
            SpellKind::Freeze => self.freeze_left,
        }
    }

    fn last_used_turn(&self, kind: SpellKind) -> u32 {
        match kind {
            SpellKind::Jump => self.jump_last_used_turn,
            SpellKind::Freeze => self.freeze_last_used_turn,
        }
    }

    /// A spell is available iff charges remain and it is not on cooldown.
    pub fn can_cast(&self, kind: SpellKind, current_turn: u32) -> bool {
        let last_used = self.last_used_turn(kind);
        self.charges(kind) > 0
            && (last_used == 0 || current_turn >= last_used + SPELL_COOLDOWN_TURNS)
    }

    pub fn cast(&mut self, kind: SpellKind, current_turn: u32) {
        match kind {
            SpellKind::Jump => {
                self.jump_left -= 1;
                self.jump_last_used_turn = current_turn;
            }
            SpellKind::Freeze => {
                self.freeze_left -= 1;
                self.freeze_last_used_turn = current_turn;
            }
        }
    }
}

/// A recorded effect with a ply-count expiry horizon, created at
/// `ply_count_at_cast + SPELL_DURATION_PLIES` so it covers the caster's
/// current ply and the opponent's next ply.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum ActiveSpell {
    Jump {
        piece_id: PieceId,
        expires_at_ply: u32,
    },
    Freeze {
        center: Square,
        occupant_ids: Vec<PieceId>,
        expires_at_ply: u32,
    },
}

impl ActiveSpell {
    pub fn expires_at_ply(&self) -> u32 {
        match self {
            ActiveSpell::Jump { expires_at_ply, .. } => *expires_at_ply,
            ActiveSpell::Freeze { expires_at_ply, .. } => *expires_at_ply,
        }
    }

    pub fn is_expired(&self, ply_count: u32) -> bool {
        ply_count >= self.expires_at_ply()
    }
}

/// The up-to-3x3 region clipped to the board, centered on `center`.
pub fn freeze_zone(center: Square) -> Vec<Square> {
    let mut squares = Vec::with_capacity(9);
    for dr in -1i32..=1 {
        for dc in -1i32..=1 {
            let row = center.row as i32 + dr;
            let col = center.col as i32 + dc;
            if let Some(sq) = Square::try_new(row, col) {
                squares.push(sq);
            }
        }
    }
    squares
}

/// Squares currently inside any active freeze zone. Kings are exempt from
/// freeze for both attack and movement purposes, so this predicate must be
/// combined with a "is this a king" check at the call site.
pub fn frozen_squares(active_spells: &[ActiveSpell]) -> HashSet<Square> {
    let mut frozen = HashSet::new();
    for spell in active_spells {
        if let ActiveSpell::Freeze { center, .. } = spell {
            frozen.extend(freeze_zone(*center));
        }
    }
    frozen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_blocks_recast_until_three_turns_later() {
        let mut state = SpellState::default();
        assert!(state.can_cast(SpellKind::Jump, 1));
        state.cast(SpellKind::Jump, 1);
        assert_eq!(state.jump_left, 1);
        assert!(!state.can_cast(SpellKind::Jump, 2));
        assert!(!state.can_cast(SpellKind::Jump, 3));
        assert!(state.can_cast(SpellKind::Jump, 4));
    }

    #[test]
    fn no_charges_means_unavailable_even_off_cooldown() {
        let mut state = SpellState::default();
        for turn in [1u32, 4, 7] {
            assert!(state.can_cast(SpellKind::Jump, turn));
            state.cast(SpellKind::Jump, turn);
        }
        assert_eq!(state.jump_left, 0);
        assert!(!state.can_cast(SpellKind::Jump, 10));
    }

    #[test]
    fn freeze_zone_clips_to_board_edges() {
        let corner = Square::new(0, 0);
        let zone = freeze_zone(corner);
        assert_eq!(zone.len(), 4);
        assert!(zone.contains(&Square::new(0, 0)));
        assert!(zone.contains(&Square::new(1, 1)));
    }

    #[test]
    fn freeze_zone_centered_is_full_nine() {
        let zone = freeze_zone(Square::new(4, 4));
        assert_eq!(zone.len(), 9);
    }

    #[test]
    fn freeze_blocks_a_knight_but_other_black_moves_remain() {
        use crate::engine::material::Color;
        use crate::engine::moves::{has_legal_moves, legal_moves_from};
        use crate::engine::state::{GameState, MoveOutcome};

        fn play(state: &GameState, from: &str, to: &str, spell: Option<String>) -> GameState {
            match state
                .apply_move(Square::parse_algebraic(from).unwrap(), Square::parse_algebraic(to).unwrap(), spell, None)
                .unwrap()
            {
                MoveOutcome::Done(s) => s,
                MoveOutcome::AwaitingPromotion(_) => panic!("unexpected pending promotion"),
            }
        }

        let s = GameState::initial();
        let s = play(&s, "g1", "f3", None);
        let s = play(&s, "b8", "c6", None);
        let c6 = Square::parse_algebraic("c6").unwrap();
        let (s, spell_notation) = s.apply_spell(SpellKind::Freeze, c6).unwrap();
        let s = play(&s, "f3", "g5", Some(spell_notation));

        assert!(legal_moves_from(&s, c6).is_empty());
        assert!(has_legal_moves(Color::Black, &s));
    }
}
