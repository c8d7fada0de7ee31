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

//! SAN-style move text with disambiguation, grounded on `board/san.rs`, but
//! emitting plain-ASCII square names rather than the teacher's parenthesized
//! `Display` forms, per the compact-action-log grammar.

use super::coord::Square;
use super::material::{Piece, PieceType, Promotion};
use super::moves::{legal_moves_from, CastleSide, LegalMove};
use super::state::GameState;

use PieceType::{King, Pawn};

/// Builds the SAN-like body of a move (no check/mate suffix, which is
/// applied by the turn executor once the resulting position is known).
pub fn move_notation(
    state_before: &GameState,
    piece: Piece,
    from: Square,
    to: Square,
    is_capture: bool,
    promotion: Option<Promotion>,
    mv: &LegalMove,
) -> String {
    if let LegalMove::Castle(side) = mv {
        return match side {
            CastleSide::Kingside => "O-O".to_string(),
            CastleSide::Queenside => "O-O-O".to_string(),
        };
    }

    if piece.kind == Pawn {
        let mut s = String::new();
        if is_capture {
            s.push(file_char(from.col));
            s.push('x');
        }
        s.push_str(&to.algebraic());
        if let Some(promo) = promotion {
            s.push('=');
            s.push(promo.san_char());
        }
        return s;
    }

    let mut s = String::new();
    s.push(piece.kind.san_char());
    s.push_str(&disambiguate(state_before, piece, from, to));
    if is_capture {
        s.push('x');
    }
    s.push_str(&to.algebraic());
    s
}

fn file_char(col: u8) -> char {
    (b'a' + col) as char
}

fn rank_char(row: u8) -> char {
    (b'0' + (8 - row)) as char
}

/// Disambiguates among same-type, same-color pieces that can also legally
/// reach `to`: file if files differ, else rank, else both.
fn disambiguate(state: &GameState, piece: Piece, from: Square, to: Square) -> String {
    if piece.kind == King {
        return String::new();
    }
    let rivals: Vec<Square> = state
        .board
        .pieces_of(piece.color)
        .into_iter()
        .filter(|(sq, p)| *sq != from && p.kind == piece.kind)
        .filter(|(sq, _)| legal_moves_from(state, *sq).iter().any(|mv| mv.destination(piece.color) == to))
        .map(|(sq, _)| sq)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|sq| sq.col != from.col) {
        return file_char(from.col).to_string();
    }
    if rivals.iter().all(|sq| sq.row != from.row) {
        return rank_char(from.row).to_string();
    }
    format!("{}{}", file_char(from.col), rank_char(from.row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pawn_push_has_no_disambiguation() {
        let state = GameState::initial();
        let from = Square::parse_algebraic("e2").unwrap();
        let to = Square::parse_algebraic("e4").unwrap();
        let piece = state.board.at(from).unwrap();
        let mv = LegalMove::DoubleAdvance(from, to);
        let notation = move_notation(&state, piece, from, to, false, None, &mv);
        assert_eq!(notation, "e4");
    }

    #[test]
    fn knight_capture_uses_x() {
        let state = GameState::initial();
        let from = Square::parse_algebraic("g1").unwrap();
        let to = Square::parse_algebraic("f3").unwrap();
        let piece = state.board.at(from).unwrap();
        let mv = LegalMove::Standard(from, to);
        let notation = move_notation(&state, piece, from, to, true, None, &mv);
        assert_eq!(notation, "Nxf3");
    }
}
