// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Druckwerk print kiosk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for a kiosk job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to a document staged in the kiosk's spool directory.
///
/// Deliberately not serialisable: the filesystem path is an internal ownership
/// boundary and must never leak into a status payload or over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef(PathBuf);

impl DocumentRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Filesystem path of the staged document. For collaborators only.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for DocumentRef {
    /// Shows only the file name, never the full path.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.file_name() {
            Some(name) => write!(f, "{}", name.to_string_lossy()),
            None => write!(f, "<unnamed>"),
        }
    }
}

/// Opaque token issued by the payment collaborator for one payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRef(pub String);

impl PaymentRef {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Display for PaymentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle returned by the print collaborator for a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintHandle(pub String);

impl std::fmt::Display for PrintHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported input document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// PDF — page count is read from the document's page tree.
    Pdf,
    /// DOC/DOCX — no cheap structural count, pages are estimated.
    DocLike,
    /// Anything else — rejected before a job is created.
    Unsupported,
}

impl DocumentFormat {
    /// Detect the format from a declared file name (case-insensitive).
    ///
    /// The name must carry an actual extension: a bare `pdf` or a stemless
    /// `.pdf` is not a PDF file named anything, it is an unsupported upload.
    pub fn from_name(name: &str) -> Self {
        let ext = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => return Self::Unsupported,
        };
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "doc" | "docx" => Self::DocLike,
            _ => Self::Unsupported,
        }
    }
}

/// Print mode chosen by the user. Drives both the tariff and the spooler's
/// colour option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    Monochrome,
    Color,
}

impl Default for PrintMode {
    fn default() -> Self {
        Self::Monochrome
    }
}

impl PrintMode {
    /// CUPS `ColorMode` option value for `lp -o`.
    pub fn lp_color_mode(&self) -> &'static str {
        match self {
            Self::Monochrome => "Monochrome",
            Self::Color => "Color",
        }
    }
}

/// Lifecycle states of a kiosk job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobState {
    /// Admitted, page count not yet resolved.
    Uploaded,
    /// Page count resolved, price quoted, waiting for the user to pay.
    Priced,
    /// Payment handle issued, waiting for the acquirer's confirmation.
    AwaitingPayment,
    /// Payment confirmed, document handed to the print collaborator.
    Printing,
    /// Printed successfully. Terminal.
    Completed,
    /// Something went wrong — see the job's failure reason. Terminal.
    Failed,
}

impl JobState {
    /// Whether no further transitions can occur from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uploaded => "uploaded",
            Self::Priced => "priced",
            Self::AwaitingPayment => "awaiting-payment",
            Self::Printing => "printing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Monetary amount in minor units (two-decimal fixed precision).
///
/// Serialises to the display form (`"120.00"`) so quotes survive JSON
/// round-trips without floating-point drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// From minor units (e.g. 1000 → 10.00).
    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// From whole major units (e.g. 10 → 10.00).
    pub fn from_major(major: i64) -> Self {
        Self(major * 100)
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// Multiply a per-page rate by a page count. Saturates on overflow —
    /// nobody prints a document that costs more than i64 minor units.
    pub fn times(&self, count: u32) -> Money {
        Money(self.0.saturating_mul(count as i64))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

impl std::str::FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major_part, frac_part) = match s.split_once('.') {
            Some((m, f)) => (m, f),
            None => (s, ""),
        };
        let major: i64 = major_part
            .parse()
            .map_err(|_| format!("invalid monetary amount: {s}"))?;
        let minor: i64 = match frac_part.len() {
            0 => 0,
            1 => {
                10 * frac_part
                    .parse::<i64>()
                    .map_err(|_| format!("invalid monetary amount: {s}"))?
            }
            2 => frac_part
                .parse()
                .map_err(|_| format!("invalid monetary amount: {s}"))?,
            _ => return Err(format!("more than two decimal places: {s}")),
        };
        if major < 0 {
            return Err(format!("negative amounts are not supported: {s}"));
        }
        Ok(Money(major * 100 + minor))
    }
}

impl Serialize for Money {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// What the payment collaborator hands back when a payment is initiated:
/// the token identifying the attempt plus a displayable proof (a scannable
/// QR payload/URL) for the kiosk screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTicket {
    pub payment_ref: PaymentRef,
    pub proof: String,
}

/// One document's journey from upload to print-or-failure.
///
/// At most one `Job` exists at a time; it is owned exclusively by the
/// orchestrator and mutated only under the job slot's lock.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub document_ref: DocumentRef,
    pub original_name: String,
    pub format: DocumentFormat,
    /// Positive once resolution succeeds; `None` before that.
    pub page_count: Option<u32>,
    pub print_mode: PrintMode,
    /// Derived from page count and mode; frozen once payment is initiated.
    pub price: Money,
    pub state: JobState,
    /// Present once `AwaitingPayment` is entered.
    pub payment_ref: Option<PaymentRef>,
    /// Displayable payment proof for the kiosk screen.
    pub payment_proof: Option<String>,
    pub print_handle: Option<PrintHandle>,
    pub created_at: DateTime<Utc>,
    pub state_entered_at: DateTime<Utc>,
    /// Present only in `Failed`.
    pub failure_reason: Option<String>,
    /// Set when payment initiation has claimed the job; the mode and price
    /// are frozen from this point even before `AwaitingPayment` is entered.
    pub payment_claimed: bool,
    /// Set when the backing document's removal has been claimed, so racing
    /// terminal paths cannot run cleanup twice.
    pub cleanup_done: bool,
}

impl Job {
    /// Create a job in `Uploaded` state with the default print mode.
    pub fn new(
        document_ref: DocumentRef,
        original_name: impl Into<String>,
        format: DocumentFormat,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            document_ref,
            original_name: original_name.into(),
            format,
            page_count: None,
            print_mode: PrintMode::default(),
            price: Money::ZERO,
            state: JobState::Uploaded,
            payment_ref: None,
            payment_proof: None,
            print_handle: None,
            created_at: now,
            state_entered_at: now,
            failure_reason: None,
            payment_claimed: false,
            cleanup_done: false,
        }
    }

    /// Move to a new state, stamping the transition time.
    pub fn enter(&mut self, state: JobState) {
        self.state = state;
        self.state_entered_at = Utc::now();
    }
}
