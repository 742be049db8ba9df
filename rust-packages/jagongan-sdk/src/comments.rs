//! Comments for one post.
//!
//! The program cannot filter by parent, so every load enumerates every comment
//! in the program and filters here. Cost grows with the total comment count,
//! not with the size of the thread.

use solana_program::pubkey::Pubkey;
use tracing::debug;

use crate::error::Result;
use crate::program::{fetch_records, RemoteProgram};
use crate::state::{Comment, Record};

/// Keep only the comments whose parent is `post`, in fetch order.
pub fn comments_for_post(all: Vec<Record<Comment>>, post: &Pubkey) -> Vec<Record<Comment>> {
    all.into_iter().filter(|c| c.account.post == *post).collect()
}

/// Lazily loaded, cached comment list for a single post.
#[derive(Debug)]
pub struct CommentThread {
    post: Pubkey,
    comments: Option<Vec<Record<Comment>>>,
}

impl CommentThread {
    pub fn new(post: Pubkey) -> Self {
        Self { post, comments: None }
    }

    pub fn post(&self) -> &Pubkey {
        &self.post
    }

    pub fn is_loaded(&self) -> bool {
        self.comments.is_some()
    }

    /// Cached comments; empty until the first successful load.
    pub fn comments(&self) -> &[Record<Comment>] {
        self.comments.as_deref().unwrap_or_default()
    }

    /// Load once; later calls return the cache until [`Self::invalidate`].
    /// A failed load leaves the thread unloaded.
    pub async fn load(&mut self, program: &dyn RemoteProgram) -> Result<&[Record<Comment>]> {
        if self.comments.is_none() {
            let all = fetch_records::<Comment>(program).await?;
            let total = all.len();
            let filtered = comments_for_post(all, &self.post);
            debug!(post = %self.post, total, matched = filtered.len(), "comments loaded");
            self.comments = Some(filtered);
        }
        Ok(self.comments())
    }

    pub fn invalidate(&mut self) {
        self.comments = None;
    }
}
