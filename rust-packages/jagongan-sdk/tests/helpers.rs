//! In-memory stand-in for the Jagongan program.
//!
//! Interprets the same instructions the SDK builds and enforces what the
//! on-chain program enforces: PDA seeds, `init` uniqueness, `has_one` on
//! close, length limits and the tip rules.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use borsh::BorshDeserialize;
use jagongan_sdk::constants::{COMMENT_LENGTH, CONTENT_LENGTH, TOPIC_LENGTH, TREASURY};
use jagongan_sdk::pda::{derive_comment_pda, derive_post_pda, derive_reaction_pda};
use jagongan_sdk::state::discriminator;
use jagongan_sdk::{
    AccountKind, Comment, JagonganError, Notification, NotificationSink, Post, ProgramAccount,
    Reaction, ReactionKind, RemoteProgram, Session,
};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};

type ProgramResult<T> = Result<T, JagonganError>;

pub struct LocalProgram {
    program_id: Pubkey,
    // Creation order doubles as enumeration order.
    accounts: Mutex<Vec<(Pubkey, Vec<u8>)>>,
    clock: AtomicI64,
    offline: AtomicBool,
    pub submissions: AtomicUsize,
    pub lookups: AtomicUsize,
}

impl Default for LocalProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalProgram {
    pub fn new() -> Self {
        Self {
            program_id: jagongan_sdk::ID,
            accounts: Mutex::new(Vec::new()),
            clock: AtomicI64::new(1_700_000_000),
            offline: AtomicBool::new(false),
            submissions: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Simulate the RPC endpoint going away.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_clock(&self, timestamp: i64) {
        self.clock.store(timestamp, Ordering::SeqCst);
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn exists(&self, address: &Pubkey) -> bool {
        self.read(address).is_some()
    }

    pub fn load<T: ProgramAccount>(&self, address: &Pubkey) -> Option<T> {
        self.read(address).and_then(|data| T::decode(&data).ok())
    }

    /// Seed an account directly, bypassing instructions.
    pub fn insert<T: ProgramAccount>(&self, address: Pubkey, account: &T) {
        self.write(address, account.encode().unwrap());
    }

    /// Store bytes as-is, e.g. a corrupt or foreign account.
    pub fn insert_raw(&self, address: Pubkey, data: Vec<u8>) {
        self.write(address, data);
    }

    /// Seed a post at an arbitrary address with a chosen timestamp.
    pub fn insert_post(&self, author: Pubkey, content: &str, timestamp: i64) -> Pubkey {
        let address = Pubkey::new_unique();
        self.insert(
            address,
            &Post {
                author,
                topic: "seed".to_string(),
                content: content.to_string(),
                likes: 0,
                dislikes: 0,
                bump: 255,
                timestamp,
                total_tips: 0,
            },
        );
        address
    }

    fn check_online(&self) -> ProgramResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(JagonganError::RpcError("connection refused".to_string()));
        }
        Ok(())
    }

    fn read(&self, address: &Pubkey) -> Option<Vec<u8>> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|(key, _)| key == address)
            .map(|(_, data)| data.clone())
    }

    fn write(&self, address: Pubkey, data: Vec<u8>) {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.iter_mut().find(|(key, _)| *key == address) {
            Some((_, existing)) => *existing = data,
            None => accounts.push((address, data)),
        }
    }

    fn close(&self, address: &Pubkey) {
        self.accounts.lock().unwrap().retain(|(key, _)| key != address);
    }

    fn init<T: ProgramAccount>(&self, address: Pubkey, account: &T) -> ProgramResult<()> {
        if self.exists(&address) {
            return Err(JagonganError::ProgramRejected(format!(
                "Allocate: account Address {{ address: {}, base: None }} already in use",
                address
            )));
        }
        self.write(address, account.encode().unwrap());
        Ok(())
    }

    fn require_seeds(expected: Pubkey, given: Pubkey) -> ProgramResult<()> {
        if expected != given {
            return Err(JagonganError::AddressConstraint(given));
        }
        Ok(())
    }

    fn post(&self, address: &Pubkey) -> ProgramResult<Post> {
        self.load::<Post>(address)
            .ok_or_else(|| JagonganError::ProgramRejected("AccountNotInitialized: tweet".to_string()))
    }

    fn execute(&self, ix: &Instruction, signer: &Pubkey) -> ProgramResult<()> {
        if ix.program_id != self.program_id {
            return Err(JagonganError::ProgramRejected("unknown program".to_string()));
        }
        let first = ix.accounts.first().ok_or_else(|| rejected("missing accounts"))?;
        if first.pubkey != *signer || !first.is_signer {
            return Err(rejected("missing required signature"));
        }
        let (disc, args) = ix.data.split_at(8);
        let account = |i: usize| -> ProgramResult<Pubkey> {
            ix.accounts
                .get(i)
                .map(|meta| meta.pubkey)
                .ok_or_else(|| rejected("not enough accounts"))
        };

        if disc == discriminator("global", "initialize") {
            let (topic, content) = <(String, String)>::try_from_slice(args).map_err(|_| rejected("bad args"))?;
            if topic.len() > TOPIC_LENGTH {
                return Err(rejected("TopicTooLong"));
            }
            if content.len() > CONTENT_LENGTH {
                return Err(rejected("ContentTooLong"));
            }
            let (expected, bump) =
                derive_post_pda(&topic, signer, &self.program_id).ok_or_else(|| rejected("MaxSeedLengthExceeded"))?;
            Self::require_seeds(expected, account(1)?)?;
            let timestamp = self.clock.fetch_add(1, Ordering::SeqCst);
            self.init(
                expected,
                &Post {
                    author: *signer,
                    topic,
                    content,
                    likes: 0,
                    dislikes: 0,
                    bump,
                    timestamp,
                    total_tips: 0,
                },
            )
        } else if disc == discriminator("global", "like_tweet") || disc == discriminator("global", "dislike_tweet") {
            let kind = if disc == discriminator("global", "like_tweet") {
                ReactionKind::Like
            } else {
                ReactionKind::Dislike
            };
            let post_address = account(2)?;
            let mut post = self.post(&post_address)?;
            let (expected, bump) = derive_reaction_pda(signer, &post_address, &self.program_id);
            Self::require_seeds(expected, account(1)?)?;
            self.init(
                expected,
                &Reaction { author: *signer, post: post_address, kind, bump },
            )?;
            match kind {
                ReactionKind::Like => post.likes += 1,
                ReactionKind::Dislike => post.dislikes += 1,
            }
            self.insert(post_address, &post);
            Ok(())
        } else if disc == discriminator("global", "reaction_remove") {
            let post_address = account(2)?;
            let mut post = self.post(&post_address)?;
            let (expected, _) = derive_reaction_pda(signer, &post_address, &self.program_id);
            Self::require_seeds(expected, account(1)?)?;
            let reaction = self
                .load::<Reaction>(&expected)
                .ok_or_else(|| rejected("AccountNotInitialized: tweet_reaction"))?;
            if reaction.author != *signer || reaction.post != post_address {
                return Err(rejected("ConstraintHasOne"));
            }
            match reaction.kind {
                ReactionKind::Like => post.likes = post.likes.checked_sub(1).ok_or_else(|| rejected("MinLikesReached"))?,
                ReactionKind::Dislike => {
                    post.dislikes = post.dislikes.checked_sub(1).ok_or_else(|| rejected("MinDislikesReached"))?
                }
            }
            self.insert(post_address, &post);
            self.close(&expected);
            Ok(())
        } else if disc == discriminator("global", "comment_tweet") {
            let content = String::try_from_slice(args).map_err(|_| rejected("bad args"))?;
            if content.len() > COMMENT_LENGTH {
                return Err(rejected("CommentTooLong"));
            }
            let post_address = account(2)?;
            self.post(&post_address)?;
            let (expected, bump) = derive_comment_pda(signer, &post_address, &content, &self.program_id);
            Self::require_seeds(expected, account(1)?)?;
            self.init(
                expected,
                &Comment { author: *signer, post: post_address, content, bump },
            )
        } else if disc == discriminator("global", "comment_remove") {
            let address = account(1)?;
            let comment = self
                .load::<Comment>(&address)
                .ok_or_else(|| rejected("AccountNotInitialized: comment"))?;
            if comment.author != *signer {
                return Err(rejected("ConstraintHasOne"));
            }
            self.close(&address);
            Ok(())
        } else if disc == discriminator("global", "tip_tweet") {
            let amount = u64::try_from_slice(args).map_err(|_| rejected("bad args"))?;
            if amount == 0 {
                return Err(rejected("ZeroAmount"));
            }
            let post_address = account(3)?;
            let mut post = self.post(&post_address)?;
            if post.author != account(1)? {
                return Err(rejected("ConstraintHasOne"));
            }
            if account(2)? != TREASURY {
                return Err(rejected("ConstraintAddress"));
            }
            post.total_tips = post.total_tips.checked_add(amount).ok_or_else(|| rejected("Overflow"))?;
            self.insert(post_address, &post);
            Ok(())
        } else {
            Err(rejected("InstructionFallbackNotFound"))
        }
    }
}

fn rejected(reason: &str) -> JagonganError {
    JagonganError::ProgramRejected(reason.to_string())
}

#[async_trait]
impl RemoteProgram for LocalProgram {
    fn program_id(&self) -> Pubkey {
        self.program_id
    }

    async fn fetch_all(&self, kind: AccountKind) -> ProgramResult<Vec<(Pubkey, Vec<u8>)>> {
        self.check_online()?;
        let disc = kind.discriminator();
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .filter(|(_, data)| data.len() >= 8 && data[..8] == disc)
            .cloned()
            .collect())
    }

    async fn fetch(&self, address: &Pubkey) -> ProgramResult<Option<Vec<u8>>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.read(address))
    }

    async fn submit(&self, instruction: Instruction, signer: &(dyn Signer + Send + Sync)) -> ProgramResult<Signature> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.execute(&instruction, &signer.pubkey())?;
        Ok(Signature::new_unique())
    }
}

/// Collects every notification for assertions.
#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications.lock().unwrap().last().cloned()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

pub fn wallet() -> (Arc<Keypair>, Session) {
    let keypair = Arc::new(Keypair::new());
    let session = Session::connected(keypair.clone());
    (keypair, session)
}
