//! Configuration for the terminal core
//!
//! [`Options`] controls how an instance interprets its input. [`Config`] is
//! the state the terminal reports back to its host (title, dimensions,
//! working directory), delivered to subscribers whenever it changes.

use std::path::Path;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Behaviour switches for a terminal instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Log unrecognized sequences and dropped bytes
    pub debug: bool,
    /// SGR 7 swaps the stored colors instead of setting a reverse flag
    pub legacy_reverse_video: bool,
    /// Theme colors used where a cell color is unset or default
    pub theme_foreground: (u8, u8, u8),
    pub theme_background: (u8, u8, u8),
    /// Columns between tab stops
    pub tab_width: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debug: false,
            legacy_reverse_video: false,
            theme_foreground: (255, 255, 255),
            theme_background: (0, 0, 0),
            tab_width: 8,
        }
    }
}

impl Options {
    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save options as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// State reported to the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Window title (OSC 0/2)
    pub title: String,
    /// Icon name (OSC 1)
    pub icon_name: String,
    pub rows: usize,
    pub cols: usize,
    /// Working directory reported via OSC 7
    pub working_dir: String,
}

/// Fan-out of config changes to subscribed hosts
#[derive(Debug, Default)]
pub struct Listeners {
    senders: Vec<SyncSender<Config>>,
}

impl Listeners {
    /// Register a listener with a bounded queue of `capacity` updates
    pub fn subscribe(&mut self, capacity: usize) -> Receiver<Config> {
        let (tx, rx) = mpsc::sync_channel(capacity);
        self.senders.push(tx);
        rx
    }

    /// Number of live listeners
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Send `config` to every listener without blocking. A listener whose
    /// queue is full misses this update; one that hung up is dropped.
    pub fn notify(&mut self, config: &Config) {
        self.senders
            .retain(|tx| match tx.try_send(config.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    tracing::trace!("Config listener full, skipping update");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
    }
}
