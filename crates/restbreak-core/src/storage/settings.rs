//! Settings store with change notification.
//!
//! Owns the on-disk [`Config`] and broadcasts the reminder timing through a
//! `tokio::sync::watch` channel. Subscribers only wake when the reminder
//! values actually change; invalid input never reaches them.

use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tracing::info;

use super::config::{Config, ReminderConfig};
use crate::error::Result;

pub struct SettingsStore {
    path: PathBuf,
    config: Config,
    tx: watch::Sender<ReminderConfig>,
}

impl SettingsStore {
    /// Open (or create) the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = Config::load_from(&path)?;
        let (tx, _rx) = watch::channel(config.reminder);
        Ok(Self { path, config, tx })
    }

    /// Open the config file at the default location.
    ///
    /// # Errors
    ///
    /// See [`SettingsStore::open`].
    pub fn open_default() -> Result<Self> {
        Self::open(Config::path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get_config(&self) -> ReminderConfig {
        self.config.reminder
    }

    /// Receiver that observes every subsequent reminder timing change.
    pub fn subscribe(&self) -> watch::Receiver<ReminderConfig> {
        self.tx.subscribe()
    }

    /// Replace the reminder timing.
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range values, or an error if the
    /// config cannot be persisted. Nothing is saved or notified on error.
    pub fn update_reminder(&mut self, reminder: ReminderConfig) -> Result<()> {
        reminder.validate()?;
        let mut next = self.config.clone();
        next.reminder = reminder;
        self.commit(next)
    }

    /// Set a value by dot-separated key, e.g. `reminder.break_seconds`.
    ///
    /// # Errors
    ///
    /// See [`Config::set`]; persistence errors are also returned.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.config.clone();
        next.set(key, value)?;
        self.commit(next)
    }

    /// Restore defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults cannot be persisted.
    pub fn reset(&mut self) -> Result<()> {
        self.commit(Config::default())
    }

    fn commit(&mut self, next: Config) -> Result<()> {
        next.save_to(&self.path)?;
        let reminder = next.reminder;
        self.config = next;
        let changed = self.tx.send_if_modified(|current| {
            if *current == reminder {
                false
            } else {
                *current = reminder;
                true
            }
        });
        if changed {
            info!(
                interval_secs = reminder.interval_seconds,
                break_secs = reminder.break_seconds,
                "reminder settings changed"
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, SettingsStore) {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::open(dir.path().join("config.toml")).unwrap();
        (dir, store)
    }

    #[test]
    fn update_persists_and_notifies() {
        let (_dir, mut store) = open_temp();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        let next = ReminderConfig {
            interval_seconds: 600,
            break_seconds: 30,
        };
        store.update_reminder(next).unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), next);
        assert_eq!(Config::load_from(store.path()).unwrap().reminder, next);
    }

    #[test]
    fn invalid_update_is_neither_saved_nor_notified() {
        let (_dir, mut store) = open_temp();
        let rx = store.subscribe();

        let result = store.update_reminder(ReminderConfig {
            interval_seconds: 30,
            break_seconds: 60,
        });

        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.get_config(), ReminderConfig::default());
        assert_eq!(
            Config::load_from(store.path()).unwrap().reminder,
            ReminderConfig::default()
        );
    }

    #[test]
    fn unchanged_values_do_not_notify() {
        let (_dir, mut store) = open_temp();
        let rx = store.subscribe();
        store.update_reminder(ReminderConfig::default()).unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn display_change_does_not_wake_reminder_subscribers() {
        let (_dir, mut store) = open_temp();
        let rx = store.subscribe();
        store
            .set(
                "displays",
                r#"[{"id":"a","width":800,"height":600},{"id":"b","x":800,"width":800,"height":600}]"#,
            )
            .unwrap();
        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.config().displays.len(), 2);
    }

    #[test]
    fn set_by_key_then_reset() {
        let (_dir, mut store) = open_temp();
        let mut rx = store.subscribe();

        store.set("reminder.interval_seconds", "900").unwrap();
        assert_eq!(rx.borrow_and_update().interval_seconds, 900);

        store.reset().unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ReminderConfig::default());
    }

    #[test]
    fn reopen_reads_persisted_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        {
            let mut store = SettingsStore::open(&path).unwrap();
            store.set("reminder.break_seconds", "120").unwrap();
        }
        let store = SettingsStore::open(&path).unwrap();
        assert_eq!(store.get_config().break_seconds, 120);
    }
}
