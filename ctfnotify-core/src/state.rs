//! Notification state tracking.
//!
//! Two append-only sets of event identifiers, one per notification kind,
//! persisted as a small JSON file between runs.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{NotifyError, NotifyResult};
use crate::notification::NotificationKind;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyState {
    /// Events that already got a "new CTF" notification
    #[serde(default, serialize_with = "serialize_sorted")]
    new_notified: HashSet<String>,

    /// Events that already got a "starts in 24h" notification
    #[serde(default, serialize_with = "serialize_sorted")]
    pre_notified: HashSet<String>,
}

impl NotifyState {
    /// Read the state file. A missing file is an empty state; anything else
    /// that goes wrong is an error.
    pub fn load(path: &Path) -> NotifyResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content)
            .map_err(|e| NotifyError::State(format!("{}: {}", path.display(), e)))
    }

    /// Overwrite the state file with the full contents of both sets.
    pub fn save(&self, path: &Path) -> NotifyResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| NotifyError::Serialization(e.to_string()))?;

        let temp = temp_path(path);
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, path)?;
        Ok(())
    }

    fn set(&self, kind: NotificationKind) -> &HashSet<String> {
        match kind {
            NotificationKind::FirstSeen => &self.new_notified,
            NotificationKind::StartingSoon => &self.pre_notified,
        }
    }

    pub fn contains(&self, kind: NotificationKind, id: &str) -> bool {
        self.set(kind).contains(id)
    }

    /// Mark `id` as notified for `kind`. Returns false if it already was.
    pub fn record(&mut self, kind: NotificationKind, id: &str) -> bool {
        let set = match kind {
            NotificationKind::FirstSeen => &mut self.new_notified,
            NotificationKind::StartingSoon => &mut self.pre_notified,
        };
        if set.contains(id) {
            return false;
        }
        set.insert(id.to_string())
    }

    pub fn len(&self, kind: NotificationKind) -> usize {
        self.set(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.new_notified.is_empty() && self.pre_notified.is_empty()
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

// Sort for deterministic output
fn serialize_sorted<S: Serializer>(
    set: &HashSet<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut sorted: Vec<&str> = set.iter().map(|s| s.as_str()).collect();
    sorted.sort_unstable();
    sorted.serialize(serializer)
}
