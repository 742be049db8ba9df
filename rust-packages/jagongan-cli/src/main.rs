//! Jagongan CLI - read and post to the Jagongan feed from a terminal.
//!
//! Configuration comes from `JAGONGAN_*` environment variables (or `.env`),
//! overridden by flags.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use jagongan_sdk::dispatch::is_rejected_before_dispatch;
use jagongan_sdk::tip::{preset_amounts, sol_to_lamports, TipSplit};
use jagongan_sdk::utils::{ellipsify, format_sol};
use jagongan_sdk::{
    AddressDeriver, ClientConfig, JagonganError, PostCard, ReactionKind, ReactionProbe, ReactionStatus,
    RemoteProgram, RpcProgram, Session, Timeline, TracingSink,
};
use serde::Serialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::read_keypair_file;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jagongan")]
#[command(about = "Jagongan social feed on Solana", long_about = None)]
#[command(version)]
struct Cli {
    /// RPC URL
    #[arg(short, long, env = "JAGONGAN_RPC_URL")]
    rpc_url: Option<String>,

    /// Program ID
    #[arg(long, env = "JAGONGAN_PROGRAM_ID")]
    program_id: Option<String>,

    /// Wallet keypair file
    #[arg(short, long, env = "JAGONGAN_KEYPAIR")]
    keypair: Option<PathBuf>,

    /// Commitment level (processed, confirmed, finalized)
    #[arg(long, env = "JAGONGAN_COMMITMENT")]
    commitment: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts, newest first
    Feed {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Publish a post
    Post { topic: String, content: String },
    /// Tip a post's author in SOL
    Tip { post: String, sol: f64 },
    /// Like a post
    Like { post: String },
    /// Dislike a post
    Dislike { post: String },
    /// Remove your reaction from a post
    Unreact { post: String },
    /// Show a post's comments
    Comments { post: String },
    /// Comment on a post
    Comment { post: String, content: String },
    /// Remove one of your comments
    Uncomment { post: String, comment: String },
    /// Check whether a wallet reacted to a post
    Reacted {
        post: String,
        /// Wallet to check; defaults to the configured keypair
        identity: Option<String>,
    },
    /// Your posts and the tips they received
    Profile,
    /// Show program information
    Info,
}

#[derive(Serialize)]
struct FeedEntry {
    address: String,
    author: String,
    topic: String,
    content: String,
    likes: u64,
    dislikes: u64,
    total_tips: u64,
    timestamp: i64,
}

impl FeedEntry {
    fn from_card(card: &PostCard) -> Self {
        let post = &card.post().account;
        Self {
            address: card.address().to_string(),
            author: post.author.to_string(),
            topic: post.topic.clone(),
            content: post.content.clone(),
            likes: post.likes,
            dislikes: post.dislikes,
            total_tips: post.total_tips,
            timestamp: post.timestamp,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(id) = &cli.program_id {
        config.program_id = Pubkey::from_str(id).context("invalid --program-id")?;
    }
    if let Some(level) = &cli.commitment {
        config.commitment = CommitmentConfig::from_str(level).context("invalid --commitment")?;
    }
    if let Some(path) = &cli.keypair {
        config.keypair_path = Some(path.clone());
    }
    Ok(config)
}

/// A missing or unreadable keypair gives a read-only session.
fn load_session(config: &ClientConfig) -> Session {
    let Some(path) = &config.keypair_path else {
        return Session::disconnected();
    };
    match read_keypair_file(path) {
        Ok(keypair) => Session::connected(Arc::new(keypair)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no wallet, read-only");
            Session::disconnected()
        }
    }
}

fn parse_pubkey(value: &str, what: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(value).with_context(|| format!("invalid {} address: {}", what, value))
}

/// Load the feed and return the card for `post`.
async fn card_for<'a>(
    timeline: &'a mut Timeline,
    program: &dyn RemoteProgram,
    post: &Pubkey,
) -> anyhow::Result<&'a mut PostCard> {
    timeline.load(program).await?;
    timeline
        .card_mut(post)
        .ok_or(JagonganError::AccountNotFound)
        .with_context(|| format!("post {}", post))
}

fn explain(err: JagonganError) -> anyhow::Error {
    if is_rejected_before_dispatch(&err) {
        anyhow!("{}", err)
    } else {
        anyhow::Error::new(err).context("transaction failed")
    }
}

fn print_card(card: &PostCard) {
    let post = &card.post().account;
    println!(
        "{}  #{:<12} {}  [+{} / -{}]  tips {} SOL",
        ellipsify(&card.address().to_string(), 4),
        post.topic,
        post.content,
        post.likes,
        post.dislikes,
        format_sol(post.total_tips),
    );
    println!("      by {}", ellipsify(&post.author.to_string(), 4));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let session = load_session(&config);
    let program = RpcProgram::new(&config);
    let mut timeline = Timeline::new(Arc::new(TracingSink));
    timeline.set_session(&program, session.clone()).await;

    match cli.command {
        Commands::Feed { json } => {
            timeline.load(&program).await?;
            if json {
                let entries: Vec<FeedEntry> = timeline.cards().map(FeedEntry::from_card).collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if timeline.feed().posts().is_empty() {
                println!("No posts yet.");
            } else {
                for card in timeline.cards() {
                    print_card(card);
                }
            }
        }
        Commands::Post { topic, content } => {
            let signature = timeline
                .create_post(&program, &session, &topic, &content)
                .await
                .map_err(explain)?;
            println!("Posted: {}", signature);
            if let Some(author) = session.identity() {
                if let Some(address) = AddressDeriver::new(config.program_id).post(&topic, &author) {
                    println!("Address: {}", address);
                }
            }
        }
        Commands::Tip { post, sol } => {
            let post = parse_pubkey(&post, "post")?;
            let amount = sol_to_lamports(sol);
            let Some(split) = TipSplit::for_amount(amount) else {
                bail!("tip amount too small: {} SOL", sol);
            };
            println!(
                "Tipping {} SOL: {} to author, {} to treasury",
                format_sol(amount),
                format_sol(split.author),
                format_sol(split.treasury),
            );
            let card = card_for(&mut timeline, &program, &post).await?;
            let signature = card
                .submit_tip(&program, &session, amount)
                .await
                .map_err(explain)?;
            println!("Tipped: {}", signature);
        }
        Commands::Like { post } => react(&mut timeline, &program, &session, &post, ReactionKind::Like).await?,
        Commands::Dislike { post } => {
            react(&mut timeline, &program, &session, &post, ReactionKind::Dislike).await?
        }
        Commands::Unreact { post } => {
            let post = parse_pubkey(&post, "post")?;
            let card = card_for(&mut timeline, &program, &post).await?;
            if !card.refresh_reaction(&program, &session).await.has_reacted() {
                println!("Nothing to remove.");
                return Ok(());
            }
            // Opens the confirmation; the command line itself is the confirmation.
            card.press_reaction(&program, &session, ReactionKind::Like)
                .await
                .map_err(explain)?;
            match card.confirm(&program, &session).await.map_err(explain)? {
                Some(signature) => println!("Reaction removed: {}", signature),
                None => println!("Nothing to remove."),
            }
        }
        Commands::Comments { post } => {
            let post = parse_pubkey(&post, "post")?;
            let card = card_for(&mut timeline, &program, &post).await?;
            card.toggle_comments(&program).await?;
            if card.comments().is_empty() {
                println!("No comments.");
            }
            for comment in card.comments() {
                println!(
                    "{}  {}: {}",
                    ellipsify(&comment.address.to_string(), 4),
                    ellipsify(&comment.account.author.to_string(), 4),
                    comment.account.content,
                );
            }
        }
        Commands::Comment { post, content } => {
            let post = parse_pubkey(&post, "post")?;
            let card = card_for(&mut timeline, &program, &post).await?;
            let signature = card
                .submit_comment(&program, &session, &content)
                .await
                .map_err(explain)?;
            println!("Commented: {}", signature);
        }
        Commands::Uncomment { post, comment } => {
            let post = parse_pubkey(&post, "post")?;
            let comment = parse_pubkey(&comment, "comment")?;
            let card = card_for(&mut timeline, &program, &post).await?;
            card.toggle_comments(&program).await?;
            let Some(record) = card.comments().iter().find(|c| c.address == comment).cloned() else {
                bail!("comment {} not found on post {}", comment, post);
            };
            if !card.can_remove(&record, &session) {
                warn!(%comment, "comment belongs to another wallet, the program will refuse");
            }
            card.request_remove_comment(comment);
            match card.confirm(&program, &session).await.map_err(explain)? {
                Some(signature) => println!("Comment removed: {}", signature),
                None => println!("Nothing to remove."),
            }
        }
        Commands::Reacted { post, identity } => {
            let post = parse_pubkey(&post, "post")?;
            let identity = match identity {
                Some(value) => parse_pubkey(&value, "wallet")?,
                None => session
                    .identity()
                    .ok_or_else(|| anyhow!("no wallet configured; pass an identity"))?,
            };
            let mut probe = ReactionProbe::new();
            let ticket = probe.begin(&AddressDeriver::new(config.program_id), identity, post);
            let result = ticket.run(&program).await;
            probe.apply(result);
            match probe.status() {
                ReactionStatus::Reacted(kind) => println!("{} reacted: {:?}", identity, kind),
                ReactionStatus::NotReacted => println!("{} has not reacted", identity),
            }
        }
        Commands::Profile => {
            let Some(identity) = session.identity() else {
                println!("Connect your wallet");
                return Ok(());
            };
            timeline.load(&program).await?;
            println!("Wallet: {}", identity);
            let feed = timeline.feed();
            let mut count = 0;
            for post in feed.by_author(&identity) {
                if let Some(card) = timeline.card(&post.address) {
                    print_card(card);
                    count += 1;
                }
            }
            if count == 0 {
                println!("No posts yet.");
            }
            println!("Total received: {} SOL", format_sol(feed.total_tips_received(&identity)));
        }
        Commands::Info => {
            println!("Jagongan");
            println!("Program ID: {}", config.program_id);
            println!("RPC: {}", config.rpc_url);
            match session.identity() {
                Some(identity) => println!("Wallet: {}", identity),
                None => println!("Wallet: none (read-only)"),
            }
            let presets: Vec<String> = preset_amounts().iter().map(|l| format_sol(*l)).collect();
            println!("Tip presets (SOL): {}", presets.join(", "));
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
        }
    }

    timeline.process_refreshes(&program).await?;
    Ok(())
}

async fn react(
    timeline: &mut Timeline,
    program: &dyn RemoteProgram,
    session: &Session,
    post: &str,
    kind: ReactionKind,
) -> anyhow::Result<()> {
    let post = parse_pubkey(post, "post")?;
    let card = card_for(timeline, program, &post).await?;
    if let ReactionStatus::Reacted(existing) = card.refresh_reaction(program, session).await {
        bail!("already reacted ({:?}); run `jagongan unreact {}` first", existing, post);
    }
    match card.press_reaction(program, session, kind).await.map_err(explain)? {
        Some(signature) => println!("{:?}: {}", kind, signature),
        None => println!("Already reacted."),
    }
    Ok(())
}
