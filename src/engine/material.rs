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

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut, Not};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Color {
    White,
    Black,
}

use Color::{Black, White};

impl Not for Color {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        match self {
            White => Black,
            Black => White,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum PieceType {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

use PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};

impl PieceType {
    /// Single-character piece letter used in SAN and in the position
    /// signature, uppercase/lowercase is applied by the caller per color.
    pub fn san_char(&self) -> char {
        match self {
            King => 'K',
            Queen => 'Q',
            Rook => 'R',
            Bishop => 'B',
            Knight => 'N',
            Pawn => 'P',
        }
    }

    pub fn is_slider(&self) -> bool {
        matches!(self, Queen | Rook | Bishop)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    pub fn san_char(&self) -> char {
        match self {
            Promotion::Queen => 'Q',
            Promotion::Rook => 'R',
            Promotion::Bishop => 'B',
            Promotion::Knight => 'N',
        }
    }

    /// Parses the promotion-piece grammar `[QRBNqrbn]`, case-insensitive.
    pub fn try_from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'Q' => Some(Promotion::Queen),
            'R' => Some(Promotion::Rook),
            'B' => Some(Promotion::Bishop),
            'N' => Some(Promotion::Knight),
            _ => None,
        }
    }
}

impl From<Promotion> for PieceType {
    fn from(value: Promotion) -> Self {
        match value {
            Promotion::Queen => Queen,
            Promotion::Rook => Rook,
            Promotion::Bishop => Bishop,
            Promotion::Knight => Knight,
        }
    }
}

/// Stable piece identity, persists across moves so spells can target a
/// piece rather than a square. Allocated from a monotonic per-board counter
/// (spec.md §5 permits, but does not require, this scheme).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
    pub id: PieceId,
    pub has_moved: bool,
    pub is_jumpable: bool,
}

impl Piece {
    pub fn new(kind: PieceType, color: Color, id: PieceId) -> Self {
        Self {
            kind,
            color,
            id,
            has_moved: false,
            is_jumpable: false,
        }
    }
}

/// Per-color storage, grounded on the teacher's `Pair<T>` used throughout
/// `board/material.rs` and `board/castling.rs` for white/black bookkeeping.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pair<T>((T, T));

impl<T> Pair<T> {
    pub const fn new(white: T, black: T) -> Self {
        Self((white, black))
    }
    pub fn white(&self) -> &T {
        &self.0 .0
    }
    pub fn white_mut(&mut self) -> &mut T {
        &mut self.0 .0
    }
    pub fn black(&self) -> &T {
        &self.0 .1
    }
    pub fn black_mut(&mut self) -> &mut T {
        &mut self.0 .1
    }
}

impl<T: Hash> Hash for Pair<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.white().hash(state);
        self.black().hash(state);
    }
}

impl<T> Index<Color> for Pair<T> {
    type Output = T;
    #[inline]
    fn index(&self, index: Color) -> &Self::Output {
        match index {
            White => self.white(),
            Black => self.black(),
        }
    }
}

impl<T> IndexMut<Color> for Pair<T> {
    #[inline]
    fn index_mut(&mut self, index: Color) -> &mut Self::Output {
        match index {
            White => self.white_mut(),
            Black => self.black_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_not_toggles() {
        assert_eq!(!White, Black);
        assert_eq!(!Black, White);
    }

    #[test]
    fn pair_indexes_by_color() {
        let mut pair = Pair::new(1, 2);
        assert_eq!(*pair.index(White), 1);
        assert_eq!(*pair.index(Black), 2);
        *pair.index_mut(White) = 10;
        assert_eq!(*pair.index(White), 10);
    }

    #[test]
    fn promotion_char_round_trip() {
        for p in [
            Promotion::Queen,
            Promotion::Rook,
            Promotion::Bishop,
            Promotion::Knight,
        ] {
            let c = p.san_char();
            assert_eq!(Promotion::try_from_char(c), Some(p));
            assert_eq!(Promotion::try_from_char(c.to_ascii_lowercase()), Some(p));
        }
    }
}
