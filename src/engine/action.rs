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

//! Compact-action tagged enum and its comma-separated string encoding
//! (spec.md §9's explicit redesign note: a sum type, not string-sniffing).

use super::coord::Square;
use super::error::EngineError;
use super::material::Promotion;
use super::spells::SpellKind;
use super::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactAction {
    Spell { kind: SpellKind, square: Square },
    Move {
        from: Square,
        to: Square,
        promo: Option<Promotion>,
    },
    Resign,
}

impl CompactAction {
    pub fn parse(token: &str) -> Result<Self, EngineError> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("r") {
            return Ok(CompactAction::Resign);
        }
        if let Some((kind_str, sq_str)) = token.split_once('@') {
            let kind = match kind_str.to_ascii_lowercase().as_str() {
                "j" | "jump" => SpellKind::Jump,
                "f" | "freeze" => SpellKind::Freeze,
                _ => return Err(EngineError::InvalidAction(format!("unknown spell kind: {token}"))),
            };
            let square = Square::parse_algebraic(sq_str)
                .ok_or_else(|| EngineError::InvalidAction(format!("bad square in {token}")))?;
            return Ok(CompactAction::Spell { kind, square });
        }
        if let Some((from_str, rest)) = token.split_once('-') {
            let from = Square::parse_algebraic(from_str)
                .ok_or_else(|| EngineError::InvalidAction(format!("bad square in {token}")))?;
            let (to_str, promo_str) = match rest.split_once('=') {
                Some((t, p)) => (t, Some(p)),
                None => (rest, None),
            };
            let to = Square::parse_algebraic(to_str)
                .ok_or_else(|| EngineError::InvalidAction(format!("bad square in {token}")))?;
            let promo = match promo_str {
                Some(p) => Some(
                    p.chars()
                        .next()
                        .and_then(Promotion::try_from_char)
                        .ok_or_else(|| EngineError::InvalidAction(format!("bad promotion in {token}")))?,
                ),
                None => None,
            };
            return Ok(CompactAction::Move { from, to, promo });
        }
        Err(EngineError::InvalidAction(format!("unrecognized token: {token}")))
    }

    pub fn format(&self) -> String {
        match self {
            CompactAction::Resign => "R".to_string(),
            CompactAction::Spell { kind, square } => {
                let letter = match kind {
                    SpellKind::Jump => 'j',
                    SpellKind::Freeze => 'f',
                };
                format!("{letter}@{}", square.algebraic())
            }
            CompactAction::Move { from, to, promo } => {
                let suffix = promo.map(|p| format!("={}", p.san_char())).unwrap_or_default();
                format!("{}-{}{}", from.algebraic(), to.algebraic(), suffix)
            }
        }
    }
}

/// Reassembles the full authoritative log from `move_log`, per spec.md §8's
/// action-concatenation invariant.
pub fn build_compact_log(state: &GameState) -> String {
    state
        .move_log
        .iter()
        .flat_map(|entry| entry.actions.iter().cloned())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_spell_prefixes() {
        assert_eq!(
            CompactAction::parse("j@e3").unwrap(),
            CompactAction::Spell { kind: SpellKind::Jump, square: Square::parse_algebraic("e3").unwrap() }
        );
        assert_eq!(
            CompactAction::parse("freeze@c6").unwrap(),
            CompactAction::Spell { kind: SpellKind::Freeze, square: Square::parse_algebraic("c6").unwrap() }
        );
    }

    #[test]
    fn parses_move_with_and_without_promotion() {
        let plain = CompactAction::parse("e2-e4").unwrap();
        assert_eq!(
            plain,
            CompactAction::Move {
                from: Square::parse_algebraic("e2").unwrap(),
                to: Square::parse_algebraic("e4").unwrap(),
                promo: None,
            }
        );
        let promo = CompactAction::parse("e7-e8=Q").unwrap();
        assert_eq!(
            promo,
            CompactAction::Move {
                from: Square::parse_algebraic("e7").unwrap(),
                to: Square::parse_algebraic("e8").unwrap(),
                promo: Some(Promotion::Queen),
            }
        );
    }

    #[test]
    fn resign_is_case_insensitive() {
        assert_eq!(CompactAction::parse("r").unwrap(), CompactAction::Resign);
        assert_eq!(CompactAction::parse("R").unwrap(), CompactAction::Resign);
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(CompactAction::parse("z9-e4").is_err());
        assert!(CompactAction::parse("nonsense").is_err());
    }
}
