//! # jagongan-sdk
//!
//! Rust client SDK for the **Jagongan** social feed program on Solana.
//!
//! The program only offers state-changing instructions and flat, per-account
//! enumeration. Everything relational (which comments belong to a post, whether
//! a wallet already reacted) is rebuilt here on the client.
//!
//! # Features
//!
//! - PDA derivation for posts, reactions and comments
//! - Account decoding and Anchor-compatible instruction builders
//! - Feed / comment / reaction queries over a [`RemoteProgram`]
//! - Mutation dispatch with notifications and a per-post state machine
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jagongan_sdk::{ClientConfig, RpcProgram, Session, Timeline, TracingSink};
//! use std::sync::Arc;
//!
//! let config = ClientConfig::from_env()?;
//! let program = RpcProgram::new(&config);
//! let mut timeline = Timeline::new(Arc::new(TracingSink));
//! timeline.load(&program).await?;
//! for card in timeline.cards() {
//!     println!("{} {}", card.post().account.topic, card.post().account.content);
//! }
//! ```

use solana_program::pubkey::Pubkey;

/// Jagongan program ID
pub const ID: Pubkey = solana_program::pubkey!("47ofz98ZHkDxec7pBjBqPwq2VqhpK4h1BDhLa8h7zZWb");

pub mod card;
pub mod comments;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod feed;
pub mod instructions;
pub mod notify;
pub mod pda;
pub mod probe;
pub mod program;
pub mod session;
pub mod state;
pub mod timeline;
pub mod tip;
pub mod utils;

pub use card::{CardEffect, CardEvent, CardState, PostCard, RefreshRequest};
pub use comments::{comments_for_post, CommentThread};
pub use config::ClientConfig;
pub use dispatch::{DispatchState, Mutation, MutationDispatcher};
pub use error::{InputError, JagonganError};
pub use feed::FeedQuery;
pub use notify::{MutationKind, Notification, NotificationSink, TracingSink};
pub use pda::AddressDeriver;
pub use probe::{ProbeResult, ProbeTicket, ReactionProbe, ReactionStatus};
pub use program::{fetch_record, fetch_records, RemoteProgram, RpcProgram};
pub use session::Session;
pub use state::{AccountKind, Comment, Post, ProgramAccount, Reaction, ReactionKind, Record};
pub use timeline::Timeline;
