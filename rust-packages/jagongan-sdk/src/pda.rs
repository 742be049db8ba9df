//! PDA derivation for Jagongan records.
//!
//! Every address here must be computed exactly as the program computes it in
//! its `seeds = [...]` constraints, otherwise the write fails with a seeds
//! constraint error. All functions are pure.

use sha2::{Digest, Sha256};
use solana_program::pubkey::Pubkey;

use crate::constants::{COMMENT_SEED, TWEET_REACTION_SEED, TWEET_SEED};

/// SHA-256 of the raw comment text, used as a comment seed.
pub fn content_digest(content: &str) -> [u8; 32] {
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&Sha256::digest(content.as_bytes()));
    arr
}

/// Derive post PDA: [topic, "TWEET_SEED", author]
///
/// Returns `None` when the topic is too long to be a seed.
pub fn derive_post_pda(topic: &str, author: &Pubkey, program_id: &Pubkey) -> Option<(Pubkey, u8)> {
    Pubkey::try_find_program_address(&[topic.as_bytes(), TWEET_SEED, author.as_ref()], program_id)
}

/// Derive reaction PDA: ["TWEET_REACTION_SEED", author, post]
pub fn derive_reaction_pda(author: &Pubkey, post: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[TWEET_REACTION_SEED, author.as_ref(), post.as_ref()],
        program_id,
    )
}

/// Derive comment PDA: ["COMMENT_SEED", author, sha256(content), post]
pub fn derive_comment_pda(
    author: &Pubkey,
    post: &Pubkey,
    content: &str,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    let digest = content_digest(content);
    Pubkey::find_program_address(
        &[COMMENT_SEED, author.as_ref(), &digest, post.as_ref()],
        program_id,
    )
}

/// PDA derivation bound to one program id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDeriver {
    program_id: Pubkey,
}

impl Default for AddressDeriver {
    fn default() -> Self {
        Self::new(crate::ID)
    }
}

impl AddressDeriver {
    pub const fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn post(&self, topic: &str, author: &Pubkey) -> Option<Pubkey> {
        derive_post_pda(topic, author, &self.program_id).map(|(address, _)| address)
    }

    pub fn reaction(&self, author: &Pubkey, post: &Pubkey) -> Pubkey {
        derive_reaction_pda(author, post, &self.program_id).0
    }

    pub fn comment(&self, author: &Pubkey, post: &Pubkey, content: &str) -> Pubkey {
        derive_comment_pda(author, post, content, &self.program_id).0
    }
}
