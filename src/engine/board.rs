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

//! The 8x8 grid plus path-clearance and attack queries (component 4.2).
//!
//! Jump and Freeze are the two places the teacher's bitboard approach would
//! not transfer: `is_jumpable` makes path clearance piece-dependent rather
//! than purely positional, and freeze zones must be re-evaluated against a
//! list of active spells rather than folded once into a static mask. Both
//! are expressed here as small scans over the 64 squares instead of
//! precomputed tables, trading the teacher's performance for clarity, which
//! is appropriate at this board size and call frequency.

use serde::{Deserialize, Serialize};

use super::coord::Square;
use super::material::{Color, Piece, PieceId, PieceType};
use super::spells::{frozen_squares, ActiveSpell};

use Color::{Black, White};
use PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }
}

impl CastlingRights {
    pub fn kingside(&self, color: Color) -> bool {
        match color {
            White => self.white_kingside,
            Black => self.black_kingside,
        }
    }
    pub fn queenside(&self, color: Color) -> bool {
        match color {
            White => self.white_queenside,
            Black => self.black_queenside,
        }
    }
    pub fn clear_both(&mut self, color: Color) {
        match color {
            White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }
    pub fn clear_kingside(&mut self, color: Color) {
        match color {
            White => self.white_kingside = false,
            Black => self.black_kingside = false,
        }
    }
    pub fn clear_queenside(&mut self, color: Color) {
        match color {
            White => self.white_queenside = false,
            Black => self.black_queenside = false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Piece>; 8]; 8],
    next_piece_id: u32,
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[None; 8]; 8],
            next_piece_id: 0,
        }
    }

    fn next_id(&mut self) -> PieceId {
        let id = PieceId(self.next_piece_id);
        self.next_piece_id += 1;
        id
    }

    /// Standard chess starting layout (spec.md §6).
    pub fn initial() -> Self {
        let mut board = Self::empty();
        const BACK_RANK: [PieceType; 8] =
            [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for (col, kind) in BACK_RANK.iter().enumerate() {
            let id = board.next_id();
            board.cells[0][col] = Some(Piece::new(*kind, Black, id));
            let id = board.next_id();
            board.cells[7][col] = Some(Piece::new(*kind, White, id));
        }
        for col in 0..8 {
            let id = board.next_id();
            board.cells[1][col] = Some(Piece::new(Pawn, Black, id));
            let id = board.next_id();
            board.cells[6][col] = Some(Piece::new(Pawn, White, id));
        }
        board
    }

    #[inline]
    pub fn at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.row as usize][sq.col as usize]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.row as usize][sq.col as usize] = piece;
    }

    pub fn place_new(&mut self, sq: Square, kind: PieceType, color: Color) -> PieceId {
        let id = self.next_id();
        self.set(sq, Some(Piece::new(kind, color, id)));
        id
    }

    pub fn squares(&self) -> impl Iterator<Item = Square> {
        (0u8..8).flat_map(|row| (0u8..8).map(move |col| Square::new(row, col)))
    }

    pub fn pieces_of(&self, color: Color) -> Vec<(Square, Piece)> {
        self.squares()
            .filter_map(|sq| self.at(sq).map(|p| (sq, p)))
            .filter(|(_, p)| p.color == color)
            .collect()
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.squares()
            .find(|&sq| matches!(self.at(sq), Some(p) if p.color == color && p.kind == King))
    }

    pub fn find_piece(&self, id: PieceId) -> Option<Square> {
        self.squares().find(|&sq| matches!(self.at(sq), Some(p) if p.id == id))
    }

    pub fn set_jumpable(&mut self, id: PieceId, jumpable: bool) {
        if let Some(sq) = self.find_piece(id) {
            if let Some(mut piece) = self.at(sq) {
                piece.is_jumpable = jumpable;
                self.set(sq, Some(piece));
            }
        }
    }
}

/// Iterates the squares strictly between `from` and `to` along their
/// shared rank, file, or diagonal. Undefined (returns empty) for
/// non-colinear inputs.
fn squares_between(from: Square, to: Square) -> Vec<Square> {
    let dr = to.row as i32 - from.row as i32;
    let dc = to.col as i32 - from.col as i32;
    if dr != 0 && dc != 0 && dr.abs() != dc.abs() {
        return Vec::new();
    }
    let steps = dr.abs().max(dc.abs());
    if steps < 2 {
        return Vec::new();
    }
    let step_r = dr.signum();
    let step_c = dc.signum();
    (1..steps)
        .map(|i| Square::new(
            (from.row as i32 + step_r * i) as u8,
            (from.col as i32 + step_c * i) as u8,
        ))
        .collect()
}

/// A square blocks a line iff it holds a piece whose `is_jumpable` is
/// false — jumpable pieces are transparent to sliders and to the pawn
/// double-push pass-through check.
pub fn path_clear(from: Square, to: Square, board: &Board) -> bool {
    squares_between(from, to)
        .into_iter()
        .all(|sq| match board.at(sq) {
            None => true,
            Some(piece) => piece.is_jumpable,
        })
}

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];
const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1), (0, -1),
    (0, 1), (1, -1), (1, 0), (1, 1),
];

fn pawn_attack_offsets(color: Color) -> [(i32, i32); 2] {
    match color {
        White => [(-1, -1), (-1, 1)],
        Black => [(1, -1), (1, 1)],
    }
}

fn is_rook_line(from: Square, to: Square) -> bool {
    from.row == to.row || from.col == to.col
}

fn is_bishop_line(from: Square, to: Square) -> bool {
    let dr = to.row as i32 - from.row as i32;
    let dc = to.col as i32 - from.col as i32;
    dr.abs() == dc.abs() && dr != 0
}

/// True iff `piece` currently contributes no attacks/moves due to Freeze.
/// Kings are exempt from freeze for both attack and movement purposes.
fn is_frozen(piece: &Piece, square: Square, active_spells: &[ActiveSpell]) -> bool {
    if piece.kind == King {
        return false;
    }
    frozen_squares(active_spells).contains(&square)
}

/// Whether `attacker_color` attacks `square`, honoring jumpable path
/// clearance and excluding frozen (non-king) attackers.
pub fn is_attacked(
    square: Square,
    attacker_color: Color,
    board: &Board,
    active_spells: &[ActiveSpell],
) -> bool {
    !get_attackers(square, attacker_color, board, active_spells).is_empty()
}

/// Full list of squares holding an `attacker_color` piece that attacks
/// `square`, used by mate-escape analysis.
pub fn get_attackers(
    square: Square,
    attacker_color: Color,
    board: &Board,
    active_spells: &[ActiveSpell],
) -> Vec<Square> {
    let mut attackers = Vec::new();
    for from in board.squares() {
        let Some(piece) = board.at(from) else { continue };
        if piece.color != attacker_color {
            continue;
        }
        if is_frozen(&piece, from, active_spells) {
            continue;
        }
        if attacks_square(from, piece, square, board) {
            attackers.push(from);
        }
    }
    attackers
}

fn attacks_square(from: Square, piece: Piece, to: Square, board: &Board) -> bool {
    if from == to {
        return false;
    }
    let dr = to.row as i32 - from.row as i32;
    let dc = to.col as i32 - from.col as i32;
    match piece.kind {
        King => KING_OFFSETS.contains(&(dr, dc)),
        Knight => KNIGHT_OFFSETS.contains(&(dr, dc)),
        Pawn => pawn_attack_offsets(piece.color).contains(&(dr, dc)),
        Rook => is_rook_line(from, to) && path_clear(from, to, board),
        Bishop => is_bishop_line(from, to) && path_clear(from, to, board),
        Queen => {
            (is_rook_line(from, to) || is_bishop_line(from, to)) && path_clear(from, to, board)
        }
    }
}

/// Finds `color`'s king and reports whether it is currently attacked.
/// Returns `false` (not an error) if the king is absent, since this is
/// used during mid-transition scratch-board queries.
pub fn is_in_check(color: Color, board: &Board, active_spells: &[ActiveSpell]) -> bool {
    match board.find_king(color) {
        Some(king_sq) => is_attacked(king_sq, !color, board, active_spells),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::material::PieceType;

    #[test]
    fn initial_board_has_32_pieces() {
        let board = Board::initial();
        let count = board.squares().filter(|&sq| board.at(sq).is_some()).count();
        assert_eq!(count, 32);
    }

    #[test]
    fn rook_path_blocked_by_non_jumpable_piece() {
        let mut board = Board::empty();
        board.place_new(Square::new(7, 0), PieceType::Rook, White);
        board.place_new(Square::new(4, 0), PieceType::Pawn, White);
        assert!(!path_clear(Square::new(7, 0), Square::new(0, 0), &board));
    }

    #[test]
    fn rook_path_clear_through_jumpable_piece() {
        let mut board = Board::empty();
        board.place_new(Square::new(7, 0), PieceType::Rook, White);
        let id = board.place_new(Square::new(4, 0), PieceType::Pawn, White);
        board.set_jumpable(id, true);
        assert!(path_clear(Square::new(7, 0), Square::new(0, 0), &board));
    }

    #[test]
    fn knight_attacks_ignore_path_clearance() {
        let mut board = Board::empty();
        board.place_new(Square::new(7, 1), PieceType::Knight, White);
        assert!(is_attacked(Square::new(5, 2), Black, &board, &[]));
    }

    #[test]
    fn frozen_non_king_attacker_contributes_no_attacks() {
        use crate::engine::spells::ActiveSpell;
        let mut board = Board::empty();
        board.place_new(Square::new(7, 1), PieceType::Knight, White);
        let active = vec![ActiveSpell::Freeze {
            center: Square::new(7, 1),
            occupant_ids: vec![],
            expires_at_ply: 10,
        }];
        assert!(!is_attacked(Square::new(5, 2), Black, &board, &active));
    }

    #[test]
    fn frozen_king_still_gives_check() {
        use crate::engine::spells::ActiveSpell;
        let mut board = Board::empty();
        board.place_new(Square::new(0, 4), PieceType::King, Black);
        board.place_new(Square::new(1, 4), PieceType::King, White);
        let active = vec![ActiveSpell::Freeze {
            center: Square::new(1, 4),
            occupant_ids: vec![],
            expires_at_ply: 10,
        }];
        assert!(is_attacked(Square::new(0, 3), White, &board, &active));
    }
}
