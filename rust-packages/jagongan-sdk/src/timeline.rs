//! The feed as a whole: one card per post plus the compose box.
//!
//! Cards survive feed refreshes (matched by post address) so an open comment
//! panel or a cached thread is not lost when the list is re-fetched. Refresh
//! requests from cards are drained with [`Timeline::process_refreshes`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::card::{PostCard, RefreshRequest};
use crate::dispatch::{Mutation, MutationDispatcher};
use crate::error::Result;
use crate::feed::FeedQuery;
use crate::notify::{MutationKind, NotificationSink};
use crate::pda::AddressDeriver;
use crate::program::RemoteProgram;
use crate::session::Session;

pub struct Timeline {
    feed: FeedQuery,
    cards: HashMap<Pubkey, PostCard>,
    compose: MutationDispatcher,
    sink: Arc<dyn NotificationSink>,
    refresh_tx: UnboundedSender<RefreshRequest>,
    refresh_rx: UnboundedReceiver<RefreshRequest>,
    pending: VecDeque<RefreshRequest>,
    needs_full: bool,
    session: Session,
}

impl Timeline {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        Self {
            feed: FeedQuery::new(),
            cards: HashMap::new(),
            compose: MutationDispatcher::new(sink.clone()),
            sink,
            refresh_tx,
            refresh_rx,
            pending: VecDeque::new(),
            needs_full: false,
            session: Session::disconnected(),
        }
    }

    pub fn feed(&self) -> &FeedQuery {
        &self.feed
    }

    /// Cards in feed order (newest first).
    pub fn cards(&self) -> impl Iterator<Item = &PostCard> {
        self.feed
            .posts()
            .iter()
            .filter_map(|post| self.cards.get(&post.address))
    }

    pub fn card(&self, post: &Pubkey) -> Option<&PostCard> {
        self.cards.get(post)
    }

    pub fn card_mut(&mut self, post: &Pubkey) -> Option<&mut PostCard> {
        self.cards.get_mut(post)
    }

    /// Whether the compose box has a post in flight.
    pub fn is_composing(&self) -> bool {
        self.compose.is_in_flight()
    }

    /// Full feed refresh. On failure the previous cards stay as they were.
    /// Cards new to this snapshot get their reaction looked up for the
    /// current session.
    pub async fn load(&mut self, program: &dyn RemoteProgram) -> Result<()> {
        self.feed.refresh(program).await?;
        let added = self.sync_cards();
        for address in added {
            if let Some(card) = self.cards.get_mut(&address) {
                card.refresh_reaction(program, &self.session).await;
            }
        }
        Ok(())
    }

    /// Returns the addresses of cards created by this sync.
    fn sync_cards(&mut self) -> Vec<Pubkey> {
        let live: HashSet<Pubkey> = self.feed.posts().iter().map(|p| p.address).collect();
        self.cards.retain(|address, _| live.contains(address));

        let mut added = Vec::new();
        for post in self.feed.posts() {
            match self.cards.get_mut(&post.address) {
                Some(card) => card.set_post(post.clone()),
                None => {
                    let card = PostCard::new(post.clone(), self.sink.clone(), self.refresh_tx.clone());
                    self.cards.insert(post.address, card);
                    added.push(post.address);
                }
            }
        }
        added
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Switch wallets (or log out with [`Session::disconnected`]). Every card
    /// re-evaluates its reaction when the identity actually changes.
    pub async fn set_session(&mut self, program: &dyn RemoteProgram, session: Session) {
        let changed = session.identity() != self.session.identity();
        self.session = session;
        if changed {
            self.refresh_reactions(program).await;
        }
    }

    pub async fn create_post(
        &mut self,
        program: &dyn RemoteProgram,
        session: &Session,
        topic: &str,
        content: &str,
    ) -> Result<Signature> {
        let deriver = AddressDeriver::new(program.program_id());
        let post = session.identity().and_then(|author| deriver.post(topic, &author));
        let refresh = self.refresh_tx.clone();

        let mutation = Mutation::CreatePost {
            topic: topic.to_string(),
            content: content.to_string(),
        };
        self.compose
            .dispatch(program, session, mutation, |_| {
                if let Some(post) = post {
                    let _ = refresh.send(RefreshRequest { post, kind: MutationKind::CreatePost });
                }
            })
            .await
    }

    /// Drain pending refresh requests. Known posts are re-fetched one by one
    /// and only their card changes; an unknown post (just created) triggers a
    /// full refresh. Returns the number of requests handled.
    ///
    /// A failed fetch stops the drain and returns the error; the failed
    /// request and everything after it stay queued for the next call.
    pub async fn process_refreshes(&mut self, program: &dyn RemoteProgram) -> Result<usize> {
        while let Ok(request) = self.refresh_rx.try_recv() {
            self.pending.push_back(request);
        }

        let mut seen = HashSet::new();
        let mut handled = 0;
        while let Some(request) = self.pending.front().copied() {
            if seen.insert(request.post) {
                if !self.cards.contains_key(&request.post) {
                    self.needs_full = true;
                } else if self.feed.refresh_post(program, &request.post).await? {
                    if let (Some(record), Some(card)) =
                        (self.feed.get(&request.post).cloned(), self.cards.get_mut(&request.post))
                    {
                        card.set_post(record);
                    }
                }
            }
            self.pending.pop_front();
            handled += 1;
        }

        if self.needs_full {
            self.load(program).await?;
            self.needs_full = false;
        }
        debug!(handled, "refreshes processed");
        Ok(handled)
    }

    /// Requests received but not yet applied.
    pub fn pending_refreshes(&self) -> usize {
        self.pending.len() + usize::from(self.needs_full)
    }

    /// Re-run the reaction lookup on every card for the current session.
    pub async fn refresh_reactions(&mut self, program: &dyn RemoteProgram) {
        for card in self.cards.values_mut() {
            card.refresh_reaction(program, &self.session).await;
        }
    }

    /// Logged out: no card may keep showing the previous wallet's reactions.
    pub fn logout(&mut self) {
        self.session = Session::disconnected();
        for card in self.cards.values_mut() {
            card.reset_probe();
        }
    }
}
