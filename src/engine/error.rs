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

use thiserror::Error;

/// Every public operation on a `GameState` returns `Result<_, EngineError>`
/// rather than an opaque boxed error, so that an HTTP collaborator can match
/// on the variant to choose a 4xx status without parsing message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("spell unavailable: {0}")]
    SpellUnavailable(String),

    #[error("spell target invalid: {0}")]
    SpellTargetInvalid(String),

    #[error("promotion required")]
    PromotionRequired,

    #[error("promotion unexpected: no pending promotion")]
    PromotionUnexpected,

    #[error("game over")]
    GameOver,
}
