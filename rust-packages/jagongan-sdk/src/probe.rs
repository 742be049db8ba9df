//! "Has this wallet reacted to this post?"
//!
//! Answered by a point lookup on the derived reaction slot. Anything other
//! than a decodable reaction account reads as "not reacted": every action
//! gated on the answer is safe to retry, so a false negative costs nothing.
//!
//! Lookups are split into [`ReactionProbe::begin`], [`ProbeTicket::run`] and
//! [`ReactionProbe::apply`] so the owner does not hold a borrow across the
//! await. Each `begin` bumps a generation counter and `apply` drops results
//! from older generations; the request itself is never cancelled.

use solana_program::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::pda::AddressDeriver;
use crate::program::RemoteProgram;
use crate::state::{ProgramAccount, Reaction, ReactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReactionStatus {
    #[default]
    NotReacted,
    Reacted(ReactionKind),
}

impl ReactionStatus {
    pub fn has_reacted(&self) -> bool {
        matches!(self, ReactionStatus::Reacted(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTicket {
    generation: u64,
    pub identity: Pubkey,
    pub post: Pubkey,
    pub reaction: Pubkey,
}

impl ProbeTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn run(self, program: &dyn RemoteProgram) -> ProbeResult {
        let status = match program.fetch(&self.reaction).await {
            Ok(Some(data)) => match Reaction::decode(&data) {
                Ok(reaction) => ReactionStatus::Reacted(reaction.kind),
                Err(e) => {
                    warn!(reaction = %self.reaction, error = %e, "malformed reaction account");
                    ReactionStatus::NotReacted
                }
            },
            Ok(None) => ReactionStatus::NotReacted,
            Err(e) => {
                warn!(reaction = %self.reaction, error = %e, "reaction lookup failed");
                ReactionStatus::NotReacted
            }
        };
        debug!(identity = %self.identity, post = %self.post, ?status, "reaction probed");
        ProbeResult { ticket: self, status }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub ticket: ProbeTicket,
    pub status: ReactionStatus,
}

#[derive(Debug, Default)]
pub struct ReactionProbe {
    generation: u64,
    target: Option<(Pubkey, Pubkey)>,
    status: ReactionStatus,
}

impl ReactionProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a lookup for (identity, post). Supersedes any earlier ticket.
    pub fn begin(&mut self, deriver: &AddressDeriver, identity: Pubkey, post: Pubkey) -> ProbeTicket {
        self.generation += 1;
        if self.target != Some((identity, post)) {
            // Never show another wallet's answer while the new one is pending.
            self.status = ReactionStatus::NotReacted;
            self.target = Some((identity, post));
        }
        ProbeTicket {
            generation: self.generation,
            identity,
            post,
            reaction: deriver.reaction(&identity, &post),
        }
    }

    /// Apply a finished lookup. Returns `false` for a superseded result.
    pub fn apply(&mut self, result: ProbeResult) -> bool {
        if result.ticket.generation != self.generation {
            debug!(
                stale = result.ticket.generation,
                latest = self.generation,
                "discarding stale reaction probe"
            );
            return false;
        }
        self.status = result.status;
        true
    }

    /// Forget the answer, e.g. on logout. In-flight tickets become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.target = None;
        self.status = ReactionStatus::NotReacted;
    }

    pub fn status(&self) -> ReactionStatus {
        self.status
    }

    pub fn has_reacted(&self) -> bool {
        self.status.has_reacted()
    }

    /// Reaction slot of the current target, if any.
    pub fn reaction_address(&self, deriver: &AddressDeriver) -> Option<Pubkey> {
        self.target
            .map(|(identity, post)| deriver.reaction(&identity, &post))
    }
}
