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

//! Folds a flat compact-action log into a `GameState` (component 4.6),
//! grounded on `board/mod.rs`'s `EngineBoard::replay` / `PlayerBoard::replay`.

use super::action::CompactAction;
use super::error::EngineError;
use super::state::{GameState, MoveOutcome};

fn with_token_context(err: EngineError, token: &str) -> EngineError {
    match err {
        EngineError::InvalidAction(msg) => EngineError::InvalidAction(format!("{msg} (token: {token})")),
        EngineError::IllegalMove(msg) => EngineError::IllegalMove(format!("{msg} (token: {token})")),
        EngineError::SpellUnavailable(msg) => EngineError::SpellUnavailable(format!("{msg} (token: {token})")),
        EngineError::SpellTargetInvalid(msg) => {
            EngineError::SpellTargetInvalid(format!("{msg} (token: {token})"))
        }
        other => other,
    }
}

/// Reconstructs a full `GameState` from a flat sequence of compact action
/// tokens, truncating silently once the game ends even if tokens remain.
pub fn replay(actions: &[String]) -> Result<GameState, EngineError> {
    let mut state = GameState::initial();
    let mut pending_spell_notation: Option<String> = None;

    for token in actions {
        if state.is_game_over {
            break;
        }
        let action = CompactAction::parse(token).map_err(|e| with_token_context(e, token))?;
        match action {
            CompactAction::Resign => {
                state = state.apply_resign().map_err(|e| with_token_context(e, token))?;
            }
            CompactAction::Spell { kind, square } => {
                if pending_spell_notation.is_some() {
                    return Err(EngineError::InvalidAction(format!(
                        "two spell tokens before a move (token: {token})"
                    )));
                }
                let (new_state, notation) = state
                    .apply_spell(kind, square)
                    .map_err(|e| with_token_context(e, token))?;
                state = new_state;
                pending_spell_notation = Some(notation);
            }
            CompactAction::Move { from, to, promo } => {
                let spell_notation = pending_spell_notation.take();
                match state
                    .apply_move(from, to, spell_notation, promo)
                    .map_err(|e| with_token_context(e, token))?
                {
                    MoveOutcome::Done(next) => state = next,
                    MoveOutcome::AwaitingPromotion(_) => return Err(EngineError::PromotionRequired),
                }
            }
        }
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(log: &str) -> Vec<String> {
        log.split(',').map(str::to_string).collect()
    }

    #[test]
    fn replays_scholars_mate_to_checkmate() {
        let state = replay(&tokens("e2-e4,e7-e5,f1-c4,b8-c6,d1-h5,g8-f6,h5-f7")).unwrap();
        assert!(state.is_game_over);
        assert_eq!(state.game_end_message.as_deref(), Some("White wins by checkmate!"));
    }

    #[test]
    fn replays_resign() {
        let state = replay(&tokens("R")).unwrap();
        assert!(state.is_game_over);
        assert_eq!(state.game_end_message.as_deref(), Some("White resigned. Black wins."));
    }

    #[test]
    fn stops_silently_after_game_over() {
        let state = replay(&tokens("R,e2-e4")).unwrap();
        assert_eq!(state.move_log.len(), 1);
    }

    #[test]
    fn surfaces_offending_token_on_failure() {
        let err = replay(&tokens("e2-e5")).unwrap_err();
        assert!(matches!(err, EngineError::IllegalMove(_)));
    }
}
