//! Random walk through the world.
//!
//! Wait for an exit line, move through a random exit, repeat. When nothing
//! arrives in time, or the room has no usable exits, look around again.

use log::{debug, info};
use rand::Rng;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::channel::PatternSet;
use crate::error::{Result, SessionError};
use crate::session::{Expect, Session};

use super::LOOK;
use super::exits::{EXIT_LIST_PATTERN, ExitSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WanderPrompt {
    ExitList,
}

/// Why a wander loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WanderStop {
    /// The server closed the connection.
    Closed,
    /// The configured move limit was reached.
    MoveLimit,
}

/// Summary of a finished wander loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WanderSummary {
    pub moves: u64,
    pub looks: u64,
    pub stop: WanderStop,
}

/// Endless observe-exits / move-randomly loop.
pub struct WanderLoop<R> {
    patterns: PatternSet<WanderPrompt>,
    rng: R,
    max_moves: Option<u64>,
}

impl<R: Rng> WanderLoop<R> {
    /// Create a loop that picks exits with `rng`.
    pub fn new(rng: R) -> Result<Self> {
        let patterns = PatternSet::new()
            .with(WanderPrompt::ExitList, EXIT_LIST_PATTERN)
            .map_err(SessionError::InvalidPattern)?;

        Ok(Self {
            patterns,
            rng,
            max_moves: None,
        })
    }

    /// Stop after `max_moves` moves instead of running forever.
    pub fn with_max_moves(mut self, max_moves: u64) -> Self {
        self.max_moves = Some(max_moves);
        self
    }

    /// Run until the stream closes or the move limit is reached.
    ///
    /// A closed stream ends the loop cleanly; any other session failure is
    /// returned as an error.
    pub async fn run<S>(&mut self, session: &mut Session<S>) -> Result<WanderSummary>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut moves = 0u64;
        let mut looks = 0u64;

        loop {
            if self.max_moves.is_some_and(|max| moves >= max) {
                info!("wandered {} moves, stopping", moves);
                return Ok(WanderSummary {
                    moves,
                    looks,
                    stop: WanderStop::MoveLimit,
                });
            }

            match self.step(session).await {
                Ok(true) => moves += 1,
                Ok(false) => looks += 1,
                Err(e) if e.is_closed() => {
                    info!("connection closed after {} moves", moves);
                    return Ok(WanderSummary {
                        moves,
                        looks,
                        stop: WanderStop::Closed,
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One observe/act cycle. Returns whether the bot moved.
    async fn step<S>(&mut self, session: &mut Session<S>) -> Result<bool>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let exits = match session.expect(&self.patterns).await? {
            Expect::Matched(found) => ExitSet::from_match(&found),
            Expect::Timeout => {
                debug!("no exit list, looking again");
                session.send_line(LOOK).await?;
                return Ok(false);
            }
        };

        match exits.choose(&mut self.rng) {
            Some(direction) => {
                debug!("exits {:?}, moving {}", exits.iter().collect::<Vec<_>>(), direction);
                session.send_line(direction.code()).await?;
                Ok(true)
            }
            None => {
                debug!("room has no exits, looking again");
                session.send_line(LOOK).await?;
                Ok(false)
            }
        }
    }
}
