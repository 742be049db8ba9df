//! Instruction builders for the Jagongan program.
//!
//! Data layout is Anchor's: `sha256("global:<ix_name>")[..8]` followed by the
//! borsh-encoded arguments. Account order follows each instruction's
//! `#[derive(Accounts)]` context on chain.

use borsh::BorshSerialize;
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::constants::TREASURY;
use crate::state::discriminator;

fn anchor_instruction<A: BorshSerialize>(
    program_id: &Pubkey,
    name: &str,
    args: A,
    accounts: Vec<AccountMeta>,
) -> Instruction {
    Instruction::new_with_borsh(*program_id, &(discriminator("global", name), args), accounts)
}

/// `initialize(topic, content)`: create a post at `post`.
pub fn initialize(
    program_id: &Pubkey,
    author: &Pubkey,
    post: &Pubkey,
    topic: &str,
    content: &str,
) -> Instruction {
    anchor_instruction(
        program_id,
        "initialize",
        (topic, content),
        vec![
            AccountMeta::new(*author, true),
            AccountMeta::new(*post, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
    )
}

fn reaction_accounts(author: &Pubkey, reaction: &Pubkey, post: &Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(*author, true),
        AccountMeta::new(*reaction, false),
        AccountMeta::new(*post, false),
        AccountMeta::new_readonly(system_program::ID, false),
    ]
}

pub fn like_tweet(program_id: &Pubkey, author: &Pubkey, reaction: &Pubkey, post: &Pubkey) -> Instruction {
    anchor_instruction(program_id, "like_tweet", (), reaction_accounts(author, reaction, post))
}

pub fn dislike_tweet(program_id: &Pubkey, author: &Pubkey, reaction: &Pubkey, post: &Pubkey) -> Instruction {
    anchor_instruction(program_id, "dislike_tweet", (), reaction_accounts(author, reaction, post))
}

/// `reaction_remove()`: closes the reaction slot, rent goes back to `author`.
pub fn reaction_remove(program_id: &Pubkey, author: &Pubkey, reaction: &Pubkey, post: &Pubkey) -> Instruction {
    anchor_instruction(
        program_id,
        "reaction_remove",
        (),
        vec![
            AccountMeta::new(*author, true),
            AccountMeta::new(*reaction, false),
            AccountMeta::new(*post, false),
        ],
    )
}

pub fn comment_tweet(
    program_id: &Pubkey,
    author: &Pubkey,
    comment: &Pubkey,
    post: &Pubkey,
    content: &str,
) -> Instruction {
    anchor_instruction(
        program_id,
        "comment_tweet",
        content,
        vec![
            AccountMeta::new(*author, true),
            AccountMeta::new(*comment, false),
            AccountMeta::new(*post, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
    )
}

/// `comment_remove()`: closes the comment, rent goes back to `author`.
pub fn comment_remove(program_id: &Pubkey, author: &Pubkey, comment: &Pubkey) -> Instruction {
    anchor_instruction(
        program_id,
        "comment_remove",
        (),
        vec![AccountMeta::new(*author, true), AccountMeta::new(*comment, false)],
    )
}

/// `tip_tweet(amount)`: lamports go to the post author minus the treasury royalty.
pub fn tip_tweet(
    program_id: &Pubkey,
    tipper: &Pubkey,
    post_author: &Pubkey,
    post: &Pubkey,
    amount: u64,
) -> Instruction {
    anchor_instruction(
        program_id,
        "tip_tweet",
        amount,
        vec![
            AccountMeta::new(*tipper, true),
            AccountMeta::new(*post_author, false),
            AccountMeta::new(TREASURY, false),
            AccountMeta::new(*post, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
    )
}
