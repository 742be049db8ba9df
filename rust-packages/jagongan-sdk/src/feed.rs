//! The post feed: every post, newest first.
//!
//! Refreshed only on demand (first load, manual refresh, after a mutation).
//! A failed refresh keeps the last good snapshot and raises an error flag.

use solana_program::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::error::Result;
use crate::program::{fetch_record, fetch_records, RemoteProgram};
use crate::state::{Post, Record};

/// Newest first. `sort_by` is stable, so equal timestamps keep fetch order.
pub fn sort_newest_first(posts: &mut [Record<Post>]) {
    posts.sort_by(|a, b| b.account.timestamp.cmp(&a.account.timestamp));
}

#[derive(Debug, Default)]
pub struct FeedQuery {
    posts: Vec<Record<Post>>,
    loaded: bool,
    last_error: Option<String>,
}

impl FeedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh(&mut self, program: &dyn RemoteProgram) -> Result<&[Record<Post>]> {
        match fetch_records::<Post>(program).await {
            Ok(mut posts) => {
                sort_newest_first(&mut posts);
                debug!(count = posts.len(), "feed refreshed");
                self.posts = posts;
                self.loaded = true;
                self.last_error = None;
                Ok(self.posts.as_slice())
            }
            Err(e) => {
                warn!(error = %e, "feed refresh failed, keeping previous result");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Re-fetch a single post in place. Returns `false` when the post is not
    /// part of the current snapshot and nothing was updated.
    pub async fn refresh_post(&mut self, program: &dyn RemoteProgram, address: &Pubkey) -> Result<bool> {
        let Some(index) = self.posts.iter().position(|p| p.address == *address) else {
            return Ok(false);
        };
        match fetch_record::<Post>(program, address).await {
            Ok(Some(record)) => {
                self.posts[index] = record;
                self.last_error = None;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                warn!(%address, error = %e, "post refresh failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn posts(&self) -> &[Record<Post>] {
        &self.posts
    }

    pub fn get(&self, address: &Pubkey) -> Option<&Record<Post>> {
        self.posts.iter().find(|p| p.address == *address)
    }

    /// Posts written by `author`, newest first.
    pub fn by_author<'a>(&'a self, author: &'a Pubkey) -> impl Iterator<Item = &'a Record<Post>> + 'a {
        self.posts.iter().filter(move |p| p.account.author == *author)
    }

    /// Lamports tipped to `author` across their posts in the snapshot.
    pub fn total_tips_received(&self, author: &Pubkey) -> u64 {
        self.by_author(author)
            .fold(0u64, |total, p| total.saturating_add(p.account.total_tips))
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
