//! Per-post interaction state.
//!
//! One [`CardState`] per post replaces a pile of independent toggles, so
//! combinations like two confirmation dialogs at once cannot be represented.
//! Transitions are driven by user events only; data arrives through the
//! effects the transition asks for.

use std::sync::Arc;

use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::comments::CommentThread;
use crate::dispatch::{Mutation, MutationDispatcher};
use crate::error::{JagonganError, Result};
use crate::notify::{MutationKind, NotificationSink};
use crate::pda::AddressDeriver;
use crate::probe::{ProbeResult, ProbeTicket, ReactionProbe, ReactionStatus};
use crate::program::RemoteProgram;
use crate::session::Session;
use crate::state::{Comment, Post, ReactionKind, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardState {
    #[default]
    Collapsed,
    CommentsOpen,
    TipFormOpen,
    /// Asking before removing the wallet's reaction
    ReactionConfirmOpen,
    /// Asking before removing this comment
    RemoveCommentConfirm(Pubkey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEvent {
    ToggleComments,
    ToggleTipForm,
    ReactionPressed,
    RemoveCommentPressed(Pubkey),
    Confirm,
    Cancel,
    MutationSucceeded,
}

/// Work a transition asks the card's owner to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEffect {
    None,
    LoadComments,
    React,
    RemoveReaction,
    RemoveComment(Pubkey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: CardState,
    pub effect: CardEffect,
}

impl CardState {
    fn to(self, effect: CardEffect) -> Transition {
        Transition { state: self, effect }
    }

    /// `reacted` is the probe's current answer; `comments_loaded` whether the
    /// thread already holds a cached list.
    pub fn next(self, event: CardEvent, reacted: bool, comments_loaded: bool) -> Transition {
        use CardState::*;

        match (self, event) {
            (CommentsOpen | RemoveCommentConfirm(_), CardEvent::ToggleComments) => Collapsed.to(CardEffect::None),
            (_, CardEvent::ToggleComments) if comments_loaded => CommentsOpen.to(CardEffect::None),
            (_, CardEvent::ToggleComments) => CommentsOpen.to(CardEffect::LoadComments),

            (TipFormOpen, CardEvent::ToggleTipForm) => Collapsed.to(CardEffect::None),
            (_, CardEvent::ToggleTipForm) => TipFormOpen.to(CardEffect::None),

            // Removing needs confirmation, reacting does not.
            // A pending comment removal keeps the dialog either way.
            (RemoveCommentConfirm(_), CardEvent::ReactionPressed) => self.to(CardEffect::None),
            (_, CardEvent::ReactionPressed) if reacted => ReactionConfirmOpen.to(CardEffect::None),
            (state, CardEvent::ReactionPressed) => state.to(CardEffect::React),

            (CommentsOpen, CardEvent::RemoveCommentPressed(comment)) => {
                RemoveCommentConfirm(comment).to(CardEffect::None)
            }
            (state, CardEvent::RemoveCommentPressed(_)) => state.to(CardEffect::None),

            (ReactionConfirmOpen, CardEvent::Confirm) if reacted => {
                ReactionConfirmOpen.to(CardEffect::RemoveReaction)
            }
            (ReactionConfirmOpen, CardEvent::Confirm) => Collapsed.to(CardEffect::None),
            (RemoveCommentConfirm(comment), CardEvent::Confirm) => {
                RemoveCommentConfirm(comment).to(CardEffect::RemoveComment(comment))
            }
            (state, CardEvent::Confirm) => state.to(CardEffect::None),

            (RemoveCommentConfirm(_), CardEvent::Cancel) => CommentsOpen.to(CardEffect::None),
            (_, CardEvent::Cancel) => Collapsed.to(CardEffect::None),

            (_, CardEvent::MutationSucceeded) => Collapsed.to(CardEffect::None),
        }
    }
}

/// Sent to the feed owner after a confirmed mutation, keyed by post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRequest {
    pub post: Pubkey,
    pub kind: MutationKind,
}

/// A post as the user interacts with it.
pub struct PostCard {
    post: Record<Post>,
    state: CardState,
    thread: CommentThread,
    probe: ReactionProbe,
    dispatcher: MutationDispatcher,
    refresh: UnboundedSender<RefreshRequest>,
}

impl PostCard {
    pub fn new(
        post: Record<Post>,
        sink: Arc<dyn NotificationSink>,
        refresh: UnboundedSender<RefreshRequest>,
    ) -> Self {
        Self {
            thread: CommentThread::new(post.address),
            post,
            state: CardState::Collapsed,
            probe: ReactionProbe::new(),
            dispatcher: MutationDispatcher::new(sink),
            refresh,
        }
    }

    pub fn address(&self) -> Pubkey {
        self.post.address
    }

    pub fn post(&self) -> &Record<Post> {
        &self.post
    }

    /// Take a re-fetched copy of this post. Other addresses are ignored.
    pub fn set_post(&mut self, post: Record<Post>) {
        if post.address == self.post.address {
            self.post = post;
        }
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn comments(&self) -> &[Record<Comment>] {
        self.thread.comments()
    }

    pub fn comments_loaded(&self) -> bool {
        self.thread.is_loaded()
    }

    pub fn reaction_status(&self) -> ReactionStatus {
        self.probe.status()
    }

    /// True while a mutation from this card is in flight; controls disable.
    pub fn is_busy(&self) -> bool {
        self.dispatcher.is_in_flight()
    }

    pub fn dispatcher(&self) -> &MutationDispatcher {
        &self.dispatcher
    }

    /// Only the author can close a comment; others get a program error.
    pub fn can_remove(&self, comment: &Record<Comment>, session: &Session) -> bool {
        session.identity() == Some(comment.account.author)
    }

    /// Apply an interaction and return the effect the caller must run.
    pub fn handle(&mut self, event: CardEvent) -> CardEffect {
        let transition = self
            .state
            .next(event, self.probe.has_reacted(), self.thread.is_loaded());
        self.state = transition.state;
        transition.effect
    }

    /// Open or close the comment panel, loading comments on first open.
    pub async fn toggle_comments(&mut self, program: &dyn RemoteProgram) -> Result<()> {
        if self.handle(CardEvent::ToggleComments) == CardEffect::LoadComments {
            if let Err(e) = self.thread.load(program).await {
                warn!(post = %self.post.address, error = %e, "failed to fetch comments");
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn toggle_tip_form(&mut self) {
        self.handle(CardEvent::ToggleTipForm);
    }

    pub fn request_remove_comment(&mut self, comment: Pubkey) -> bool {
        self.handle(CardEvent::RemoveCommentPressed(comment));
        self.state == CardState::RemoveCommentConfirm(comment)
    }

    pub fn cancel(&mut self) {
        self.handle(CardEvent::Cancel);
    }

    /// Start a reaction lookup for the current wallet. Logged out resets.
    pub fn begin_probe(&mut self, session: &Session, program_id: Pubkey) -> Option<ProbeTicket> {
        match session.identity() {
            Some(identity) => Some(self.probe.begin(
                &AddressDeriver::new(program_id),
                identity,
                self.post.address,
            )),
            None => {
                self.probe.reset();
                None
            }
        }
    }

    pub fn apply_probe(&mut self, result: ProbeResult) -> bool {
        self.probe.apply(result)
    }

    pub fn reset_probe(&mut self) {
        self.probe.reset();
        if self.state == CardState::ReactionConfirmOpen {
            self.state = CardState::Collapsed;
        }
    }

    /// Probe and apply in one go, for callers with nothing to interleave.
    pub async fn refresh_reaction(&mut self, program: &dyn RemoteProgram, session: &Session) -> ReactionStatus {
        if let Some(ticket) = self.begin_probe(session, program.program_id()) {
            let result = ticket.run(program).await;
            self.apply_probe(result);
        }
        self.probe.status()
    }

    /// React, or open the removal confirmation if a reaction already exists.
    /// `Ok(None)` means the confirmation opened and nothing was sent.
    pub async fn press_reaction(
        &mut self,
        program: &dyn RemoteProgram,
        session: &Session,
        kind: ReactionKind,
    ) -> Result<Option<Signature>> {
        match self.handle(CardEvent::ReactionPressed) {
            CardEffect::React => {
                let mutation = Mutation::React { post: self.post.address, kind };
                self.run(program, session, mutation).await.map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Confirm whichever dialog is open.
    pub async fn confirm(&mut self, program: &dyn RemoteProgram, session: &Session) -> Result<Option<Signature>> {
        let mutation = match self.handle(CardEvent::Confirm) {
            CardEffect::RemoveReaction => {
                let identity = session.identity().ok_or(JagonganError::WalletNotConnected)?;
                let reaction = AddressDeriver::new(program.program_id()).reaction(&identity, &self.post.address);
                Mutation::RemoveReaction { post: self.post.address, reaction }
            }
            CardEffect::RemoveComment(comment) => Mutation::RemoveComment { comment },
            _ => return Ok(None),
        };
        self.run(program, session, mutation).await.map(Some)
    }

    pub async fn submit_comment(
        &mut self,
        program: &dyn RemoteProgram,
        session: &Session,
        content: &str,
    ) -> Result<Signature> {
        let mutation = Mutation::Comment {
            post: self.post.address,
            content: content.to_string(),
        };
        self.run(program, session, mutation).await
    }

    pub async fn submit_tip(
        &mut self,
        program: &dyn RemoteProgram,
        session: &Session,
        amount: u64,
    ) -> Result<Signature> {
        let mutation = Mutation::Tip {
            post: self.post.address,
            author: self.post.account.author,
            amount,
        };
        self.run(program, session, mutation).await
    }

    async fn run(&mut self, program: &dyn RemoteProgram, session: &Session, mutation: Mutation) -> Result<Signature> {
        let kind = mutation.kind();
        let post = self.post.address;
        let refresh = self.refresh.clone();

        let signature = self
            .dispatcher
            .dispatch(program, session, mutation, |_| {
                // Receiver gone means nobody renders this feed anymore.
                let _ = refresh.send(RefreshRequest { post, kind });
            })
            .await?;

        self.handle(CardEvent::MutationSucceeded);
        match kind {
            MutationKind::Comment | MutationKind::RemoveComment => self.thread.invalidate(),
            MutationKind::Like | MutationKind::Dislike | MutationKind::RemoveReaction => {
                self.refresh_reaction(program, session).await;
            }
            MutationKind::Tip | MutationKind::CreatePost => {}
        }
        Ok(signature)
    }
}

impl std::fmt::Debug for PostCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostCard")
            .field("post", &self.post.address)
            .field("state", &self.state)
            .field("reaction", &self.probe.status())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
