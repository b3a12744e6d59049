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

//! The playback engine core: a track queue, a pluggable source/sink audio
//! pipeline, a single-track session, and the command-loop supervisor that
//! ties them together.
//!
//! Hosting layers (a REPL, a chat bot) talk to [`PlayerHandle`] only; the
//! supervisor, queue, and session types are public for composing custom
//! sources/sinks/resolvers but are never constructed directly by a host.

#[macro_use]
extern crate log;

pub mod cache;
pub mod events;
pub mod handle;
mod process_util;
pub mod queue;
pub mod resolver;
pub mod sink;
pub mod source;
pub mod supervisor;

mod session;

pub use cache::{MemoryCache, RequestCache};
pub use events::{Listener, PlaybackEvent};
pub use handle::{CurrentSessionInfo, PlayerHandle};
pub use queue::TrackQueue;
pub use resolver::{RoutingResolver, TrackResolver};
pub use session::{PauseGate, PlaybackSession};
pub use sink::{AudioSink, PacingSink, PcmWriter, ProcessPcmWriter};
pub use source::{AudioSource, PcmReader, RoutingSource};
pub use supervisor::PlaybackLoop;
