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

//! Coordinate primitives: `Square` is a (row, col) pair, row 0 is rank 8 and
//! col 0 is file a, matching the board layout described by the data model.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    #[inline]
    pub const fn in_bounds(row: i32, col: i32) -> bool {
        row >= 0 && row < 8 && col >= 0 && col < 8
    }

    #[inline]
    pub fn try_new(row: i32, col: i32) -> Option<Self> {
        if Self::in_bounds(row, col) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Converts to algebraic notation, e.g. `(0, 0) -> "a8"`.
    pub fn algebraic(&self) -> String {
        let file = (b'a' + self.col) as char;
        let rank = 8 - self.row;
        format!("{file}{rank}")
    }

    /// Parses algebraic notation, e.g. `"e4" -> Some(Square{row:4,col:4})`.
    pub fn parse_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        let col = (file as u8) - b'a';
        let row = 8 - (rank.to_digit(10)? as u8);
        Some(Self::new(row, col))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algebraic_round_trip_corners() {
        assert_eq!(Square::new(0, 0).algebraic(), "a8");
        assert_eq!(Square::new(7, 7).algebraic(), "h1");
        assert_eq!(Square::new(4, 4).algebraic(), "e4");
    }

    #[test]
    fn parse_algebraic_accepts_valid_squares() {
        assert_eq!(Square::parse_algebraic("a8"), Some(Square::new(0, 0)));
        assert_eq!(Square::parse_algebraic("h1"), Some(Square::new(7, 7)));
        assert_eq!(Square::parse_algebraic("e4"), Some(Square::new(4, 4)));
    }

    #[test]
    fn parse_algebraic_rejects_malformed_input() {
        assert_eq!(Square::parse_algebraic("i4"), None);
        assert_eq!(Square::parse_algebraic("a9"), None);
        assert_eq!(Square::parse_algebraic("a"), None);
        assert_eq!(Square::parse_algebraic("a44"), None);
    }
}
