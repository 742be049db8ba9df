//! Constants shared with the on-chain Jagongan program.

use solana_program::pubkey::Pubkey;

// =============================================================================
// PDA SEEDS
// =============================================================================

/// Seed for post PDAs: [topic, "TWEET_SEED", author]
pub const TWEET_SEED: &[u8] = b"TWEET_SEED";

/// Seed for reaction PDAs: ["TWEET_REACTION_SEED", author, post]
pub const TWEET_REACTION_SEED: &[u8] = b"TWEET_REACTION_SEED";

/// Seed for comment PDAs: ["COMMENT_SEED", author, sha256(content), post]
pub const COMMENT_SEED: &[u8] = b"COMMENT_SEED";

// =============================================================================
// LENGTH LIMITS (bytes)
// =============================================================================

/// The topic is used verbatim as a PDA seed, so it can't exceed one seed.
pub const TOPIC_LENGTH: usize = 32;

pub const CONTENT_LENGTH: usize = 500;

pub const COMMENT_LENGTH: usize = 500;

// =============================================================================
// TIPPING
// =============================================================================

/// Treasury receiving the tip royalty
pub const TREASURY: Pubkey = solana_program::pubkey!("BGwManNyZ2dQpUTRCDBdyMd8BqKF7bS1EJA7fycMmAw6");

/// Royalty taken from every tip: 8 / 1000 = 0.8%
pub const ROYALTY_NUMERATOR: u64 = 8;
pub const ROYALTY_DENOMINATOR: u64 = 1000;

/// Quick-tip buttons, in SOL
pub const TIP_PRESETS_SOL: [f64; 3] = [0.001, 0.01, 0.1];

// =============================================================================
// ANCHOR LAYOUT
// =============================================================================

/// Anchor account / instruction discriminator length
pub const DISCRIMINATOR_LEN: usize = 8;
