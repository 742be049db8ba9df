//! User-facing notifications for mutations.
//!
//! Purely observational: nothing a sink does feeds back into dispatch.

use solana_sdk::signature::Signature;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreatePost,
    Tip,
    Like,
    Dislike,
    RemoveReaction,
    Comment,
    RemoveComment,
}

impl MutationKind {
    pub fn failure_message(&self) -> &'static str {
        match self {
            MutationKind::CreatePost => "Failed to send tweet",
            MutationKind::Tip => "Failed to tip",
            MutationKind::Like => "Failed to like",
            MutationKind::Dislike => "Failed to dislike",
            MutationKind::RemoveReaction => "Failed to remove reaction",
            MutationKind::Comment => "Failed to comment",
            MutationKind::RemoveComment => "Failed to remove comment",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            MutationKind::CreatePost => "Tweet sent",
            MutationKind::Tip => "Tip sent",
            MutationKind::Like => "Liked",
            MutationKind::Dislike => "Disliked",
            MutationKind::RemoveReaction => "Reaction removed",
            MutationKind::Comment => "Comment posted",
            MutationKind::RemoveComment => "Comment removed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success { kind: MutationKind, signature: Signature },
    Failure { kind: MutationKind },
}

impl Notification {
    pub fn kind(&self) -> MutationKind {
        match self {
            Notification::Success { kind, .. } | Notification::Failure { kind } => *kind,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notification::Success { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Notification::Success { kind, signature } => {
                format!("{}: {}", kind.success_message(), signature)
            }
            Notification::Failure { kind } => kind.failure_message().to_string(),
        }
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Logs notifications; the default sink for headless front ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        if notification.is_success() {
            info!(kind = ?notification.kind(), "{}", notification.message());
        } else {
            error!(kind = ?notification.kind(), "{}", notification.message());
        }
    }
}

/// Forward notifications to an event loop. A closed receiver drops them.
impl NotificationSink for UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        let _ = self.send(notification);
    }
}
