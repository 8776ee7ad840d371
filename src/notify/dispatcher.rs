//! Notification delivery: native notifier first, OSC 777 as the fallback

use std::io::Write;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use super::osc::write_osc777;
use crate::app::Config;
use crate::context::Platform;
use crate::runner::{CommandRunner, QueryError};

/// Content of a "task finished" notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub subtitle: String,
    pub message: String,
}

impl Notification {
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            message: config.message.clone(),
        }
    }

    /// Single-line body for channels without a subtitle
    pub fn body(&self) -> String {
        format!("{}: {}", self.subtitle, self.message)
    }
}

/// Channel a notification went out on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Native,
    Osc777,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("{0} not found in PATH")]
    NotifierMissing(String),
    #[error("notifier failed: {0}")]
    Notifier(QueryError),
    #[error("failed to write terminal notification: {0}")]
    Terminal(#[from] std::io::Error),
}

impl From<QueryError> for DeliveryError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NotFound { program } => DeliveryError::NotifierMissing(program),
            other => DeliveryError::Notifier(other),
        }
    }
}

/// Result of a successful delivery
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered(Channel),
    /// The native notifier failed; the OSC 777 fallback was sent instead
    FellBack { reason: DeliveryError },
}

impl DeliveryOutcome {
    pub fn channel(&self) -> Channel {
        match self {
            DeliveryOutcome::Delivered(channel) => *channel,
            DeliveryOutcome::FellBack { .. } => Channel::Osc777,
        }
    }

    /// Message to surface to the user, if delivery did not go as planned
    pub fn warning(&self) -> Option<String> {
        match self {
            DeliveryOutcome::Delivered(_) => None,
            DeliveryOutcome::FellBack { reason } => Some(reason.to_string()),
        }
    }
}

/// Sends notifications for one platform, writing OSC sequences to `out`
pub struct Dispatcher<'a, W: Write> {
    runner: &'a dyn CommandRunner,
    platform: Platform,
    notifier_command: String,
    timeout: Duration,
    out: W,
}

impl<'a, W: Write> Dispatcher<'a, W> {
    pub fn new(runner: &'a dyn CommandRunner, platform: Platform, config: &Config, out: W) -> Self {
        Self {
            runner,
            platform,
            notifier_command: config.notifier_command.clone(),
            timeout: config.notifier_timeout(),
            out,
        }
    }

    pub async fn dispatch(
        &mut self,
        notification: &Notification,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        if self.platform != Platform::MacOs {
            self.send_osc(notification)?;
            return Ok(DeliveryOutcome::Delivered(Channel::Osc777));
        }

        match self.send_native(notification).await {
            Ok(()) => {
                info!("Notification sent via {}", self.notifier_command);
                Ok(DeliveryOutcome::Delivered(Channel::Native))
            }
            Err(err) => {
                let reason = DeliveryError::from(err);
                error!("{} failed: {}", self.notifier_command, reason);
                self.send_osc(notification)?;
                Ok(DeliveryOutcome::FellBack { reason })
            }
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    async fn send_native(&self, notification: &Notification) -> Result<(), QueryError> {
        let args: [&str; 6] = [
            "-title",
            &notification.title,
            "-subtitle",
            &notification.subtitle,
            "-message",
            &notification.message,
        ];
        let args = args.map(String::from);

        self.runner
            .run(&self.notifier_command, &args, self.timeout)
            .await
            .map(|_| ())
    }

    fn send_osc(&mut self, notification: &Notification) -> std::io::Result<()> {
        write_osc777(&mut self.out, &notification.title, &notification.body())?;
        info!("Notification sent via OSC 777");
        Ok(())
    }
}
