/*
 * MIT License
 *
 * termusic - Copyright (c) 2021 Larry Hao
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Data model, configuration and error types shared across the playback engine.
//!
//! This crate has no async runtime dependency of its own beyond what is needed
//! to describe configuration; the engine crate owns all the scheduling.

#[macro_use]
extern crate log;

pub mod command;
pub mod config;
pub mod error;
pub mod state;
pub mod track;

pub use command::{PlaybackEndReason, PlaybackEndResult, PlayerCommand};
pub use config::{CacheConfig, DecoderConfig, FetcherConfig, LoopConfig, PlayerConfig, ResolverConfig};
pub use error::{CacheError, ConfigError, PlaybackError, ResolverError, SinkError, SourceError};
pub use state::{PlayerState, RepeatMode};
pub use track::{InputKind, Track, TrackRequest};
