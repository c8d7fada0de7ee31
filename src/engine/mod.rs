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

//! The Spell Chess rules engine: a deterministic, side-effect-free state
//! machine. See each submodule for its slice of the component design.

mod action;
mod board;
mod coord;
mod error;
mod material;
mod moves;
mod notation;
mod replay;
mod spells;
mod state;

pub use action::*;
pub use board::*;
pub use coord::*;
pub use error::*;
pub use material::*;
pub use moves::*;
pub use replay::*;
pub use spells::*;
pub use state::*;

pub use notation::move_notation;
