//! Orchestration of the six state-changing calls.
//!
//! A dispatcher is either idle or in flight. Input is checked before anything
//! is sent, the required PDAs are derived, and the instruction is submitted.
//! Success runs the caller's completion callback and emits a success
//! notification; failure emits the generic failure notification for that kind
//! and logs the cause. Nothing is retried, queued or timed out.
//!
//! Two dispatches for the same derived address (double click, second tab) are
//! not blocked here. The program's `init` constraint lets at most one succeed
//! and the other surfaces as a failure. Overlapping dispatches on one
//! dispatcher keep it in flight until the last of them settles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tokio::sync::watch;
use tracing::{error, info};

use crate::constants::{COMMENT_LENGTH, CONTENT_LENGTH, TOPIC_LENGTH};
use crate::error::{InputError, JagonganError, Result};
use crate::instructions;
use crate::notify::{MutationKind, Notification, NotificationSink};
use crate::pda::AddressDeriver;
use crate::program::RemoteProgram;
use crate::session::Session;
use crate::state::ReactionKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreatePost { topic: String, content: String },
    Tip { post: Pubkey, author: Pubkey, amount: u64 },
    React { post: Pubkey, kind: ReactionKind },
    RemoveReaction { post: Pubkey, reaction: Pubkey },
    Comment { post: Pubkey, content: String },
    RemoveComment { comment: Pubkey },
}

fn check_text(field: &'static str, text: &str, max: usize) -> std::result::Result<(), InputError> {
    if text.trim().is_empty() {
        return Err(InputError::Empty(field));
    }
    if text.len() > max {
        return Err(InputError::TooLong { field, len: text.len(), max });
    }
    Ok(())
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::CreatePost { .. } => MutationKind::CreatePost,
            Mutation::Tip { .. } => MutationKind::Tip,
            Mutation::React { kind: ReactionKind::Like, .. } => MutationKind::Like,
            Mutation::React { kind: ReactionKind::Dislike, .. } => MutationKind::Dislike,
            Mutation::RemoveReaction { .. } => MutationKind::RemoveReaction,
            Mutation::Comment { .. } => MutationKind::Comment,
            Mutation::RemoveComment { .. } => MutationKind::RemoveComment,
        }
    }

    /// The post this mutation touches, when it targets an existing one.
    pub fn post(&self) -> Option<Pubkey> {
        match self {
            Mutation::Tip { post, .. }
            | Mutation::React { post, .. }
            | Mutation::RemoveReaction { post, .. }
            | Mutation::Comment { post, .. } => Some(*post),
            Mutation::CreatePost { .. } | Mutation::RemoveComment { .. } => None,
        }
    }

    /// Client-side checks that mirror the program's own `require!`s.
    pub fn validate(&self) -> std::result::Result<(), InputError> {
        match self {
            Mutation::CreatePost { topic, content } => {
                check_text("topic", topic, TOPIC_LENGTH)?;
                check_text("content", content, CONTENT_LENGTH)
            }
            Mutation::Tip { amount, .. } if *amount == 0 => Err(InputError::ZeroAmount),
            Mutation::Comment { content, .. } => check_text("comment", content, COMMENT_LENGTH),
            _ => Ok(()),
        }
    }

    /// Build the instruction for `signer`, deriving whatever PDA it needs.
    pub fn instruction(&self, deriver: &AddressDeriver, signer: &Pubkey) -> Result<Instruction> {
        let program_id = deriver.program_id();
        let ix = match self {
            Mutation::CreatePost { topic, content } => {
                let post = deriver.post(topic, signer).ok_or(InputError::TooLong {
                    field: "topic",
                    len: topic.len(),
                    max: TOPIC_LENGTH,
                })?;
                instructions::initialize(program_id, signer, &post, topic, content)
            }
            Mutation::Tip { post, author, amount } => {
                instructions::tip_tweet(program_id, signer, author, post, *amount)
            }
            Mutation::React { post, kind } => {
                let reaction = deriver.reaction(signer, post);
                match kind {
                    ReactionKind::Like => instructions::like_tweet(program_id, signer, &reaction, post),
                    ReactionKind::Dislike => instructions::dislike_tweet(program_id, signer, &reaction, post),
                }
            }
            Mutation::RemoveReaction { post, reaction } => {
                instructions::reaction_remove(program_id, signer, reaction, post)
            }
            Mutation::Comment { post, content } => {
                let comment = deriver.comment(signer, post, content);
                instructions::comment_tweet(program_id, signer, &comment, post, content)
            }
            Mutation::RemoveComment { comment } => {
                instructions::comment_remove(program_id, signer, comment)
            }
        };
        Ok(ix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    InFlight(MutationKind),
}

/// One submission in flight. The last guard dropped puts the dispatcher back
/// to idle, whether it ended in success, failure, a panicking callback, or the
/// dispatch future being dropped mid-await.
struct InFlightGuard<'a> {
    state: &'a watch::Sender<DispatchState>,
    count: &'a AtomicUsize,
}

impl<'a> InFlightGuard<'a> {
    fn enter(state: &'a watch::Sender<DispatchState>, count: &'a AtomicUsize, kind: MutationKind) -> Self {
        count.fetch_add(1, Ordering::AcqRel);
        state.send_replace(DispatchState::InFlight(kind));
        Self { state, count }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.state.send_replace(DispatchState::Idle);
        }
    }
}

pub struct MutationDispatcher {
    sink: Arc<dyn NotificationSink>,
    state: watch::Sender<DispatchState>,
    in_flight: AtomicUsize,
}

impl MutationDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        let (state, _) = watch::channel(DispatchState::Idle);
        Self { sink, state, in_flight: AtomicUsize::new(0) }
    }

    pub fn state(&self) -> DispatchState {
        *self.state.borrow()
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state(), DispatchState::InFlight(_))
    }

    /// Watch idle / in-flight transitions, e.g. to disable a button.
    pub fn subscribe(&self) -> watch::Receiver<DispatchState> {
        self.state.subscribe()
    }

    pub async fn dispatch<F>(
        &self,
        program: &dyn RemoteProgram,
        session: &Session,
        mutation: Mutation,
        on_success: F,
    ) -> Result<Signature>
    where
        F: FnOnce(&Signature),
    {
        // Rejected input never reaches the program and never notifies.
        mutation.validate()?;
        let signer = session.signer()?;

        let kind = mutation.kind();
        let deriver = AddressDeriver::new(program.program_id());
        let instruction = mutation.instruction(&deriver, &signer.pubkey())?;

        let _guard = InFlightGuard::enter(&self.state, &self.in_flight, kind);
        match program.submit(instruction, signer).await {
            Ok(signature) => {
                info!(?kind, %signature, "mutation confirmed");
                on_success(&signature);
                self.sink.notify(Notification::Success { kind, signature });
                Ok(signature)
            }
            Err(e) => {
                error!(?kind, error = %e, "mutation failed");
                self.sink.notify(Notification::Failure { kind });
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for MutationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationDispatcher")
            .field("state", &self.state())
            .finish()
    }
}

/// Whether `err` came from input checks rather than from the program.
pub fn is_rejected_before_dispatch(err: &JagonganError) -> bool {
    matches!(err, JagonganError::InvalidInput(_) | JagonganError::WalletNotConnected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_text() {
        let post = Pubkey::new_unique();
        let blank = Mutation::Comment { post, content: "   ".to_string() };
        assert_eq!(blank.validate(), Err(InputError::Empty("comment")));

        let no_topic = Mutation::CreatePost { topic: String::new(), content: "gm".to_string() };
        assert_eq!(no_topic.validate(), Err(InputError::Empty("topic")));
    }

    #[test]
    fn test_validate_rejects_zero_tip() {
        let tip = Mutation::Tip {
            post: Pubkey::new_unique(),
            author: Pubkey::new_unique(),
            amount: 0,
        };
        assert_eq!(tip.validate(), Err(InputError::ZeroAmount));
    }

    #[test]
    fn test_validate_rejects_long_topic() {
        let post = Mutation::CreatePost { topic: "t".repeat(33), content: "gm".to_string() };
        assert!(matches!(post.validate(), Err(InputError::TooLong { field: "topic", .. })));
    }

    #[test]
    fn test_like_and_dislike_target_same_slot() {
        let deriver = AddressDeriver::default();
        let signer = Pubkey::new_unique();
        let post = Pubkey::new_unique();

        let like = Mutation::React { post, kind: ReactionKind::Like }
            .instruction(&deriver, &signer)
            .unwrap();
        let dislike = Mutation::React { post, kind: ReactionKind::Dislike }
            .instruction(&deriver, &signer)
            .unwrap();

        assert_eq!(like.accounts[1].pubkey, deriver.reaction(&signer, &post));
        assert_eq!(like.accounts[1].pubkey, dislike.accounts[1].pubkey);
    }

    #[test]
    fn test_comment_instruction_uses_content_pda() {
        let deriver = AddressDeriver::default();
        let signer = Pubkey::new_unique();
        let post = Pubkey::new_unique();

        let ix = Mutation::Comment { post, content: "nice".to_string() }
            .instruction(&deriver, &signer)
            .unwrap();
        assert_eq!(ix.accounts[1].pubkey, deriver.comment(&signer, &post, "nice"));
    }

    #[test]
    fn test_kind_and_post() {
        let post = Pubkey::new_unique();
        let react = Mutation::React { post, kind: ReactionKind::Dislike };
        assert_eq!(react.kind(), MutationKind::Dislike);
        assert_eq!(react.post(), Some(post));

        let remove = Mutation::RemoveComment { comment: Pubkey::new_unique() };
        assert_eq!(remove.post(), None);
    }

    #[test]
    fn test_guard_returns_to_idle() {
        let (state, _) = watch::channel(DispatchState::Idle);
        let count = AtomicUsize::new(0);
        {
            let _guard = InFlightGuard::enter(&state, &count, MutationKind::Tip);
            assert_eq!(*state.borrow(), DispatchState::InFlight(MutationKind::Tip));
        }
        assert_eq!(*state.borrow(), DispatchState::Idle);
    }

    #[test]
    fn test_idle_only_after_last_guard() {
        let (state, _) = watch::channel(DispatchState::Idle);
        let count = AtomicUsize::new(0);

        let slow = InFlightGuard::enter(&state, &count, MutationKind::Tip);
        let fast = InFlightGuard::enter(&state, &count, MutationKind::Like);
        drop(fast);
        assert_eq!(*state.borrow(), DispatchState::InFlight(MutationKind::Like));

        drop(slow);
        assert_eq!(*state.borrow(), DispatchState::Idle);
        assert_eq!(count.load(Ordering::Acquire), 0);
    }
}
