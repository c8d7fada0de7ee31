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

//! The turn executor (component 4.5): `GameState`, `apply_move`,
//! `apply_promotion`, `apply_resign`, `apply_spell`, and finalization —
//! grounded on `board/play.rs`'s `PlayState<EngineMode>`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::board::{is_in_check, Board};
use super::coord::Square;
use super::error::EngineError;
use super::material::{Color, Pair, PieceId, PieceType, Promotion};
use super::moves::{apply_to_scratch, has_legal_moves, home_rank, validate_move, LegalMove};
use super::notation::move_notation;
use super::spells::{freeze_zone, ActiveSpell, SpellKind, SpellState, SPELL_DURATION_PLIES};
use super::board::CastlingRights;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveLogEntry {
    pub turn: u32,
    pub player: Color,
    pub notation: String,
    pub actions: Vec<String>,
    pub ply_snapshot_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AwaitingPromotion {
    pub r: u8,
    pub c: u8,
    pub color: Color,
    pub from_r: u8,
    pub from_c: u8,
    pub original_move_notation: String,
    pub moving_piece_id: PieceId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub current_player: Color,
    pub game_turn_number: u32,
    pub ply_count: u32,
    pub spells: Pair<SpellState>,
    pub active_spells: Vec<ActiveSpell>,
    pub move_log: Vec<MoveLogEntry>,
    pub en_passant_target: Option<Square>,
    pub castling_rights: CastlingRights,
    pub is_game_over: bool,
    pub game_end_message: Option<String>,
    pub awaiting_promotion: Option<AwaitingPromotion>,
    pub history: Vec<GameSnapshot>,
    pub repetition_counter: HashMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub board: Board,
    pub current_player: Color,
    pub game_turn_number: u32,
    pub ply_count: u32,
    pub spells: Pair<SpellState>,
    pub active_spells: Vec<ActiveSpell>,
    pub move_log: Vec<MoveLogEntry>,
    pub en_passant_target: Option<Square>,
    pub castling_rights: CastlingRights,
    pub is_game_over: bool,
    pub game_end_message: Option<String>,
    pub awaiting_promotion: Option<AwaitingPromotion>,
}

impl From<&GameState> for GameSnapshot {
    fn from(state: &GameState) -> Self {
        Self {
            board: state.board.clone(),
            current_player: state.current_player,
            game_turn_number: state.game_turn_number,
            ply_count: state.ply_count,
            spells: state.spells,
            active_spells: state.active_spells.clone(),
            move_log: state.move_log.clone(),
            en_passant_target: state.en_passant_target,
            castling_rights: state.castling_rights,
            is_game_over: state.is_game_over,
            game_end_message: state.game_end_message.clone(),
            awaiting_promotion: state.awaiting_promotion.clone(),
        }
    }
}

pub enum MoveOutcome {
    Done(GameState),
    AwaitingPromotion(GameState),
}

/// Canonical string uniquely identifying a playable position for
/// threefold-repetition purposes; folds in spell cooldown markers so two
/// positions with identical playable futures are never falsely merged.
pub fn position_signature(state: &GameState) -> String {
    let mut rows = Vec::with_capacity(8);
    for row in 0..8u8 {
        let mut line = String::with_capacity(8);
        for col in 0..8u8 {
            match state.board.at(Square::new(row, col)) {
                None => line.push(' '),
                Some(piece) => {
                    let mut c = piece.kind.san_char();
                    if piece.color == Color::Black {
                        c = c.to_ascii_lowercase();
                    }
                    line.push(c);
                    if piece.is_jumpable {
                        line.push('*');
                    }
                }
            }
        }
        rows.push(line);
    }
    let board_part = rows.join("/");
    let turn_part = match state.current_player {
        Color::White => "w",
        Color::Black => "b",
    };
    let mut castling = String::new();
    if state.castling_rights.white_kingside {
        castling.push('K');
    }
    if state.castling_rights.white_queenside {
        castling.push('Q');
    }
    if state.castling_rights.black_kingside {
        castling.push('k');
    }
    if state.castling_rights.black_queenside {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }
    let ep_part = state
        .en_passant_target
        .map(|sq| sq.algebraic())
        .unwrap_or_else(|| "-".to_string());
    let cooldowns = format!(
        "{},{},{},{}",
        state.spells[Color::White].jump_last_used_turn,
        state.spells[Color::White].freeze_last_used_turn,
        state.spells[Color::Black].jump_last_used_turn,
        state.spells[Color::Black].freeze_last_used_turn,
    );
    format!("{board_part}|{turn_part}|{castling}|{ep_part}|{cooldowns}")
}

fn update_active_spells(board: &mut Board, active_spells: &[ActiveSpell], ply_count: u32) -> Vec<ActiveSpell> {
    let mut retained = Vec::with_capacity(active_spells.len());
    for spell in active_spells {
        if spell.is_expired(ply_count) {
            if let ActiveSpell::Jump { piece_id, .. } = spell {
                board.set_jumpable(*piece_id, false);
            }
        } else {
            retained.push(spell.clone());
        }
    }
    retained
}

fn compact_spell_token(spell_notation: &str) -> String {
    match spell_notation.split_once('@') {
        Some((kind, sq)) => {
            let first = kind.chars().next().unwrap_or('j');
            format!("{first}@{sq}")
        }
        None => spell_notation.to_string(),
    }
}

impl GameState {
    pub fn initial() -> Self {
        let mut state = GameState {
            board: Board::initial(),
            current_player: Color::White,
            game_turn_number: 1,
            ply_count: 0,
            spells: Pair::new(SpellState::default(), SpellState::default()),
            active_spells: Vec::new(),
            move_log: Vec::new(),
            en_passant_target: None,
            castling_rights: CastlingRights::default(),
            is_game_over: false,
            game_end_message: None,
            awaiting_promotion: None,
            history: Vec::new(),
            repetition_counter: HashMap::new(),
        };
        let snapshot = GameSnapshot::from(&state);
        let sig = position_signature(&state);
        state.history.push(snapshot);
        state.repetition_counter.insert(sig, 1);
        state
    }

    /// Used only by the jump-escape search in `moves::has_legal_moves`: a
    /// cheap clone-and-swap to probe legality on a hypothetical board.
    pub(crate) fn with_board(&self, board: Board) -> GameState {
        let mut clone = self.clone();
        clone.board = board;
        clone
    }

    pub fn apply_spell(&self, kind: SpellKind, sq: Square) -> Result<(GameState, String), EngineError> {
        if self.is_game_over {
            return Err(EngineError::GameOver);
        }
        let color = self.current_player;
        if !self.spells[color].can_cast(kind, self.game_turn_number) {
            return Err(EngineError::SpellUnavailable(format!(
                "{kind} is unavailable for {color}"
            )));
        }
        let mut state = self.clone();
        match kind {
            SpellKind::Jump => {
                let Some(piece) = state.board.at(sq) else {
                    return Err(EngineError::SpellTargetInvalid(format!(
                        "no piece at {}",
                        sq.algebraic()
                    )));
                };
                state.spells[color].cast(kind, state.game_turn_number);
                state.board.set_jumpable(piece.id, true);
                state.active_spells.push(ActiveSpell::Jump {
                    piece_id: piece.id,
                    expires_at_ply: state.ply_count + SPELL_DURATION_PLIES,
                });
            }
            SpellKind::Freeze => {
                state.spells[color].cast(kind, state.game_turn_number);
                let occupant_ids = freeze_zone(sq)
                    .into_iter()
                    .filter_map(|s| state.board.at(s).map(|p| p.id))
                    .collect();
                state.active_spells.push(ActiveSpell::Freeze {
                    center: sq,
                    occupant_ids,
                    expires_at_ply: state.ply_count + SPELL_DURATION_PLIES,
                });
            }
        }
        let notation = format!("{}@{}", kind.to_string().to_lowercase(), sq.algebraic());
        Ok((state, notation))
    }

    pub fn apply_move(
        &self,
        from: Square,
        to: Square,
        spell_notation: Option<String>,
        promotion_piece: Option<Promotion>,
    ) -> Result<MoveOutcome, EngineError> {
        if self.is_game_over {
            return Err(EngineError::GameOver);
        }
        let mv = validate_move(self, from, to)?;
        let piece = self
            .board
            .at(from)
            .expect("validate_move only returns moves starting from an occupied square");
        let is_capture = self.board.at(to).is_some() || matches!(mv, LegalMove::EnPassant(..));
        let body = move_notation(self, piece, from, to, is_capture, None, &mv);

        let board = apply_to_scratch(&self.board, &mv, piece.color);

        let mut castling_rights = self.castling_rights;
        if piece.kind == PieceType::King {
            castling_rights.clear_both(piece.color);
        }
        if piece.kind == PieceType::Rook {
            let rank = home_rank(piece.color);
            if from == Square::new(rank, 0) {
                castling_rights.clear_queenside(piece.color);
            } else if from == Square::new(rank, 7) {
                castling_rights.clear_kingside(piece.color);
            }
        }

        let double_push_target = match mv {
            LegalMove::DoubleAdvance(from, to) => {
                Some(Square::new((from.row + to.row) / 2, from.col))
            }
            _ => None,
        };

        let promotion_rank = match piece.color {
            Color::White => 0,
            Color::Black => 7,
        };
        let reaches_last_rank = piece.kind == PieceType::Pawn && to.row == promotion_rank;

        if reaches_last_rank && promotion_piece.is_none() {
            let mut state = self.clone();
            state.board = board;
            state.castling_rights = castling_rights;
            state.awaiting_promotion = Some(AwaitingPromotion {
                r: to.row,
                c: to.col,
                color: piece.color,
                from_r: from.row,
                from_c: from.col,
                original_move_notation: body,
                moving_piece_id: piece.id,
            });
            return Ok(MoveOutcome::AwaitingPromotion(state));
        }

        let mut board = board;
        let promotion = if reaches_last_rank { promotion_piece } else { None };
        if let Some(promo) = promotion {
            if let Some(mut p) = board.at(to) {
                p.kind = promo.into();
                board.set(to, Some(p));
            }
        }
        let body = match promotion {
            Some(promo) => format!("{body}={}", promo.san_char()),
            None => body,
        };

        let mut state = self.clone();
        state.castling_rights = castling_rights;
        let finalized = state.finalize(board, from, to, promotion, body, spell_notation, double_push_target);
        Ok(MoveOutcome::Done(finalized))
    }

    pub fn apply_promotion(
        &self,
        promotion_piece: Promotion,
        spell_notation: Option<String>,
    ) -> Result<GameState, EngineError> {
        if self.is_game_over {
            return Err(EngineError::GameOver);
        }
        let Some(pending) = self.awaiting_promotion.clone() else {
            return Err(EngineError::PromotionUnexpected);
        };
        let to = Square::new(pending.r, pending.c);
        let from = Square::new(pending.from_r, pending.from_c);
        let mut board = self.board.clone();
        if let Some(mut p) = board.at(to) {
            p.kind = promotion_piece.into();
            board.set(to, Some(p));
        }
        let mut state = self.clone();
        state.awaiting_promotion = None;
        let body = format!("{}={}", pending.original_move_notation, promotion_piece.san_char());
        let finalized = state.finalize(board, from, to, Some(promotion_piece), body, spell_notation, None);
        Ok(finalized)
    }

    pub fn apply_resign(&self) -> Result<GameState, EngineError> {
        if self.is_game_over {
            return Err(EngineError::GameOver);
        }
        let mut state = self.clone();
        let winner = !state.current_player;
        let mover = state.current_player;
        state.is_game_over = true;
        state.game_end_message = Some(format!("{mover} resigned. {winner} wins."));
        let ply_snapshot_index = state.history.len();
        state.move_log.push(MoveLogEntry {
            turn: state.game_turn_number,
            player: mover,
            notation: "R".to_string(),
            actions: vec!["R".to_string()],
            ply_snapshot_index,
        });
        state.history.push(GameSnapshot::from(&state));
        Ok(state)
    }

    /// Folds compact-action assembly, ply/turn bookkeeping, spell expiry,
    /// game-end detection, and repetition counting into the next state.
    fn finalize(
        &self,
        mut board: Board,
        from: Square,
        to: Square,
        promotion: Option<Promotion>,
        move_notation_body: String,
        spell_notation: Option<String>,
        double_push_target: Option<Square>,
    ) -> GameState {
        let mover = self.current_player;
        let opponent = !mover;

        let mut compact_actions = Vec::new();
        if let Some(sn) = &spell_notation {
            compact_actions.push(compact_spell_token(sn));
        }
        let promo_suffix = promotion
            .map(|p| format!("={}", p.san_char()))
            .unwrap_or_default();
        compact_actions.push(format!("{}-{}{}", from.algebraic(), to.algebraic(), promo_suffix));

        let ply_count = self.ply_count + 1;
        let active_spells = update_active_spells(&mut board, &self.active_spells, ply_count);

        let mut is_game_over = false;
        let mut game_end_message: Option<String> = None;
        let mut suffix = "";

        if board.find_king(opponent).is_none() {
            is_game_over = true;
            game_end_message = Some(format!("{mover} wins by king capture!"));
            suffix = "#";
        } else {
            let mut probe = self.clone();
            probe.board = board.clone();
            probe.active_spells = active_spells.clone();
            probe.ply_count = ply_count;
            probe.current_player = opponent;

            let opponent_in_check = is_in_check(opponent, &board, &active_spells);
            let opponent_has_moves = has_legal_moves(opponent, &probe);

            if opponent_in_check && !opponent_has_moves {
                is_game_over = true;
                game_end_message = Some(format!("{mover} wins by checkmate!"));
                suffix = "#";
            } else if !opponent_in_check && !opponent_has_moves {
                is_game_over = true;
                game_end_message = Some("Draw by stalemate.".to_string());
            } else if opponent_in_check {
                suffix = "+";
            }
        }

        let notation = match &spell_notation {
            Some(sn) => format!("{sn} {move_notation_body}{suffix}"),
            None => format!("{move_notation_body}{suffix}"),
        };

        let ply_snapshot_index = self.history.len();
        let mut move_log = self.move_log.clone();
        move_log.push(MoveLogEntry {
            turn: self.game_turn_number,
            player: mover,
            notation,
            actions: compact_actions,
            ply_snapshot_index,
        });

        let mut game_turn_number = self.game_turn_number;
        let mut current_player = self.current_player;
        if !is_game_over {
            if mover == Color::Black {
                game_turn_number += 1;
            }
            current_player = opponent;
        }

        let en_passant_target = double_push_target;

        let mut new_state = GameState {
            board,
            current_player,
            game_turn_number,
            ply_count,
            spells: self.spells,
            active_spells,
            move_log,
            en_passant_target,
            castling_rights: self.castling_rights,
            is_game_over,
            game_end_message,
            awaiting_promotion: None,
            history: self.history.clone(),
            repetition_counter: self.repetition_counter.clone(),
        };

        let signature = position_signature(&new_state);
        let count = new_state.repetition_counter.entry(signature).or_insert(0);
        *count += 1;
        if *count >= 3 {
            new_state.is_game_over = true;
            new_state.game_end_message = Some("Draw by threefold repetition.".to_string());
        }

        let snapshot = GameSnapshot::from(&new_state);
        new_state.history.push(snapshot);

        new_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::parse_algebraic(s).unwrap()
    }

    fn play(state: &GameState, from: &str, to: &str) -> GameState {
        match state.apply_move(sq(from), sq(to), None, None).unwrap() {
            MoveOutcome::Done(s) => s,
            MoveOutcome::AwaitingPromotion(_) => panic!("unexpected pending promotion"),
        }
    }

    #[test]
    fn scholars_mate_ends_in_checkmate() {
        let s = GameState::initial();
        let s = play(&s, "e2", "e4");
        let s = play(&s, "e7", "e5");
        let s = play(&s, "f1", "c4");
        let s = play(&s, "b8", "c6");
        let s = play(&s, "d1", "h5");
        let s = play(&s, "g8", "f6");
        let s = play(&s, "h5", "f7");
        assert!(s.is_game_over);
        assert_eq!(s.game_end_message.as_deref(), Some("White wins by checkmate!"));
        assert!(s.move_log.last().unwrap().notation.ends_with('#'));
    }

    #[test]
    fn kingside_castle_clears_rights_and_relocates_rook() {
        let s = GameState::initial();
        let s = play(&s, "e2", "e4");
        let s = play(&s, "e7", "e5");
        let s = play(&s, "g1", "f3");
        let s = play(&s, "g8", "f6");
        let s = play(&s, "f1", "c4");
        let s = play(&s, "f8", "c5");
        let s = play(&s, "e1", "g1");
        assert!(matches!(s.board.at(sq("g1")), Some(p) if p.kind == PieceType::King));
        assert!(matches!(s.board.at(sq("f1")), Some(p) if p.kind == PieceType::Rook));
        assert!(!s.castling_rights.white_kingside);
        assert!(!s.castling_rights.white_queenside);
        assert_eq!(s.move_log.last().unwrap().notation, "O-O");
    }

    #[test]
    fn resign_reports_winner_without_changing_turn() {
        let s = GameState::initial();
        let s = s.apply_resign().unwrap();
        assert!(s.is_game_over);
        assert_eq!(
            s.game_end_message.as_deref(),
            Some("White resigned. Black wins.")
        );
        assert_eq!(s.move_log.len(), 1);
        assert_eq!(s.move_log[0].actions, vec!["R".to_string()]);
    }

    #[test]
    fn threefold_repetition_ends_the_game() {
        let mut s = GameState::initial();
        let shuffle = [
            ("g1", "f3"),
            ("g8", "f6"),
            ("f3", "g1"),
            ("f6", "g8"),
            ("g1", "f3"),
            ("g8", "f6"),
            ("f3", "g1"),
            ("f6", "g8"),
        ];
        for (from, to) in shuffle {
            s = play(&s, from, to);
        }
        assert!(s.is_game_over);
        assert_eq!(
            s.game_end_message.as_deref(),
            Some("Draw by threefold repetition.")
        );
    }
}
