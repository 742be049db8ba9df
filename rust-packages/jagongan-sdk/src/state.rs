//! Client-side mirrors of the on-chain account layouts.
//!
//! Every account starts with the 8-byte Anchor discriminator
//! `sha256("account:<Name>")[..8]`, followed by the borsh-encoded fields. The
//! program allocates `INIT_SPACE` for strings, so trailing padding is expected
//! and ignored when decoding.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_program::native_token::LAMPORTS_PER_SOL;
use solana_program::pubkey::Pubkey;

use crate::constants::DISCRIMINATOR_LEN;
use crate::error::{JagonganError, Result};

/// Compute the Anchor discriminator for `"<namespace>:<name>"`.
pub fn discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(name.as_bytes());

    let result = hasher.finalize();
    let mut arr = [0u8; DISCRIMINATOR_LEN];
    arr.copy_from_slice(&result[..DISCRIMINATOR_LEN]);
    arr
}

/// Account types the program stores, as seen by enumeration queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Tweet,
    Reaction,
    Comment,
}

impl AccountKind {
    pub fn name(&self) -> &'static str {
        match self {
            AccountKind::Tweet => "Tweet",
            AccountKind::Reaction => "Reaction",
            AccountKind::Comment => "Comment",
        }
    }

    pub fn discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        discriminator("account", self.name())
    }
}

/// A typed account stored by the program.
pub trait ProgramAccount: BorshDeserialize + BorshSerialize + Sized {
    const KIND: AccountKind;

    /// Decode raw account data, checking the discriminator first.
    fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(JagonganError::InvalidAccountData(format!(
                "{} account is only {} bytes",
                Self::KIND.name(),
                data.len()
            )));
        }
        let (disc, mut body) = data.split_at(DISCRIMINATOR_LEN);
        if disc != Self::KIND.discriminator() {
            return Err(JagonganError::InvalidAccountData(format!(
                "discriminator mismatch for {}",
                Self::KIND.name()
            )));
        }
        // `deserialize` rather than `try_from_slice`: padding follows the fields.
        Self::deserialize(&mut body)
            .map_err(|e| JagonganError::InvalidAccountData(format!("{}: {}", Self::KIND.name(), e)))
    }

    /// Encode with the discriminator prefix, as the program would store it.
    fn encode(&self) -> Result<Vec<u8>> {
        let mut data = Self::KIND.discriminator().to_vec();
        self.serialize(&mut data)
            .map_err(|e| JagonganError::InvalidAccountData(e.to_string()))?;
        Ok(data)
    }
}

/// A decoded account together with its address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<T> {
    pub address: Pubkey,
    pub account: T,
}

impl<T: ProgramAccount> Record<T> {
    pub fn decode(address: Pubkey, data: &[u8]) -> Result<Self> {
        Ok(Self {
            address,
            account: T::decode(data)?,
        })
    }
}

/// A post (`Tweet` on chain). Counters are only ever changed by the program.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub author: Pubkey,
    pub topic: String,
    pub content: String,
    pub likes: u64,
    pub dislikes: u64,
    pub bump: u8,
    /// Unix timestamp (seconds) taken from the cluster clock at creation
    pub timestamp: i64,
    /// Accumulated tips in lamports, royalty included
    pub total_tips: u64,
}

impl Post {
    pub fn total_tips_sol(&self) -> f64 {
        self.total_tips as f64 / LAMPORTS_PER_SOL as f64
    }
}

impl ProgramAccount for Post {
    const KIND: AccountKind = AccountKind::Tweet;
}

/// Reaction polarity. Both kinds live in the same PDA slot.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    Like,
    Dislike,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub author: Pubkey,
    pub post: Pubkey,
    pub kind: ReactionKind,
    pub bump: u8,
}

impl ProgramAccount for Reaction {
    const KIND: AccountKind = AccountKind::Reaction;
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: Pubkey,
    pub post: Pubkey,
    pub content: String,
    pub bump: u8,
}

impl ProgramAccount for Comment {
    const KIND: AccountKind = AccountKind::Comment;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            author: Pubkey::new_unique(),
            topic: "sol".to_string(),
            content: "gm".to_string(),
            likes: 3,
            dislikes: 1,
            bump: 254,
            timestamp: 1_700_000_000,
            total_tips: 12_500_000,
        }
    }

    #[test]
    fn test_discriminators_are_distinct() {
        let tweet = AccountKind::Tweet.discriminator();
        let reaction = AccountKind::Reaction.discriminator();
        let comment = AccountKind::Comment.discriminator();

        assert_ne!(tweet, reaction);
        assert_ne!(tweet, comment);
        assert_ne!(reaction, comment);
    }

    #[test]
    fn test_decode_ignores_trailing_padding() {
        let post = sample_post();
        let mut data = post.encode().unwrap();
        data.extend_from_slice(&[0u8; 64]);

        assert_eq!(Post::decode(&data).unwrap(), post);
    }

    #[test]
    fn test_decode_rejects_other_account_type() {
        let comment = Comment {
            author: Pubkey::new_unique(),
            post: Pubkey::new_unique(),
            content: "nice".to_string(),
            bump: 255,
        };
        let data = comment.encode().unwrap();

        assert!(matches!(
            Post::decode(&data),
            Err(JagonganError::InvalidAccountData(_))
        ));
    }

    #[test]
    fn test_decode_rejects_short_data() {
        assert!(Reaction::decode(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_reaction_kind_encoding() {
        // Like = 0, Dislike = 1, same as the program enum
        assert_eq!(borsh::to_vec(&ReactionKind::Like).unwrap(), vec![0]);
        assert_eq!(borsh::to_vec(&ReactionKind::Dislike).unwrap(), vec![1]);
    }

    #[test]
    fn test_total_tips_sol() {
        let post = sample_post();
        assert!((post.total_tips_sol() - 0.0125).abs() < f64::EPSILON);
    }
}
