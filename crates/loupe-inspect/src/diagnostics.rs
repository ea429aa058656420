#![forbid(unsafe_code)]

//! Opt-in structured event log.
//!
//! When enabled (config `diagnostics` or `LOUPE_DIAGNOSTICS=true`), the
//! inspector records one [`DiagnosticEntry`] per state change. Entries
//! serialize to JSONL. Sequence numbers are process-wide and monotonic;
//! timestamps derive from the sequence number when
//! `LOUPE_DIAGNOSTICS_DETERMINISTIC=true` so runs can be diffed.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use web_time::Instant;

use loupe_core::ToolMode;
use loupe_core::dom::NodeId;

/// Oldest entries are dropped past this.
const MAX_ENTRIES: usize = 5_000;

static SEQ: AtomicU64 = AtomicU64::new(0);

fn timestamp_us(seq: u64) -> u64 {
    static DETERMINISTIC: OnceLock<bool> = OnceLock::new();
    static START: OnceLock<Instant> = OnceLock::new();
    let deterministic = *DETERMINISTIC.get_or_init(|| {
        std::env::var("LOUPE_DIAGNOSTICS_DETERMINISTIC")
            .is_ok_and(|v| v.eq_ignore_ascii_case("true"))
    });
    if deterministic {
        seq.saturating_mul(1_000)
    } else {
        u64::try_from(START.get_or_init(Instant::now).elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticEventKind {
    Activated,
    Deactivated,
    ToolChanged,
    Highlighted,
    Selected,
    ExpandToggled,
    PanelClosed,
    SpacingRendered,
    InfoShown,
    ClipboardFailed,
}

/// One JSONL record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticEntry {
    pub seq: u64,
    #[serde(rename = "ts_us")]
    pub timestamp_us: u64,
    pub kind: DiagnosticEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ToolMode>,
    #[serde(rename = "prev_mode", skip_serializing_if = "Option::is_none")]
    pub previous_mode: Option<ToolMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// FNV-1a over the payload fields, hex.
    pub checksum: String,
}

impl DiagnosticEntry {
    /// A new entry stamped with the next sequence number.
    pub fn new(kind: DiagnosticEventKind) -> Self {
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            seq,
            timestamp_us: timestamp_us(seq),
            kind,
            mode: None,
            previous_mode: None,
            node: None,
            count: None,
            enabled: None,
            context: None,
            checksum: String::new(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ToolMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_previous_mode(mut self, mode: Option<ToolMode>) -> Self {
        self.previous_mode = mode;
        self
    }

    #[must_use]
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// FNV-1a over everything but `seq` and the timestamp.
    fn payload_checksum(&self) -> String {
        let payload = format!(
            "{:?}{:?}{:?}{:?}{:?}{:?}{}",
            self.kind,
            self.mode,
            self.previous_mode,
            self.node.map(NodeId::get),
            self.count,
            self.enabled,
            self.context.as_deref().unwrap_or("")
        );
        let hash = payload.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| {
            (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
        format!("{hash:016x}")
    }
}

/// Entries recorded so far, oldest first.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Vec<DiagnosticEntry>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checksum and append `entry`, dropping the oldest when full.
    pub fn record(&mut self, mut entry: DiagnosticEntry) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        entry.checksum = entry.payload_checksum();
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[DiagnosticEntry] {
        &self.entries
    }

    pub fn entries_of_kind(&self, kind: DiagnosticEventKind) -> impl Iterator<Item = &DiagnosticEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// One JSON object per line.
    pub fn to_jsonl(&self) -> String {
        self.entries
            .iter()
            .filter_map(|e| serde_json::to_string(e).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
