// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kiosk configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DruckwerkError, Result};
use crate::types::{Money, PrintMode};

/// Per-mode page rates and the currency label shown on the kiosk screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tariff {
    pub monochrome: Money,
    pub color: Money,
    pub currency: String,
}

impl Tariff {
    pub fn rate(&self, mode: PrintMode) -> Money {
        match mode {
            PrintMode::Monochrome => self.monochrome,
            PrintMode::Color => self.color,
        }
    }
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            monochrome: Money::from_major(10),
            color: Money::from_major(30),
            currency: "RUB".into(),
        }
    }
}

/// Delays and outcomes for the simulated collaborators (reference deployment
/// without a real acquirer or spooler).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Delay before the payment handle/QR proof is issued.
    pub payment_issue_delay_ms: u64,
    /// Delay before the simulated acquirer confirms payment.
    pub payment_confirm_delay_ms: u64,
    /// Delay before the simulated printer reports completion.
    pub print_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            payment_issue_delay_ms: 1_000,
            payment_confirm_delay_ms: 8_000,
            print_delay_ms: 2_000,
        }
    }
}

/// Station settings, loadable from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskConfig {
    /// Page rates per print mode.
    pub tariff: Tariff,
    /// Directory where uploaded documents are staged until printed.
    pub spool_dir: PathBuf,
    /// How long to wait in `AwaitingPayment` before failing the job.
    pub payment_deadline_secs: u64,
    /// How long to wait in `Printing` before failing the job.
    pub print_deadline_secs: u64,
    /// Simulated collaborator timing.
    pub simulation: SimulationConfig,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            tariff: Tariff::default(),
            spool_dir: PathBuf::from("spool"),
            payment_deadline_secs: 90,
            print_deadline_secs: 120,
            simulation: SimulationConfig::default(),
        }
    }
}

impl KioskConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DruckwerkError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = serde_json::from_str(&raw)
            .map_err(|e| DruckwerkError::Config(format!("cannot parse {}: {e}", path.display())))?;
        Ok(config)
    }

    pub fn payment_deadline(&self) -> Duration {
        Duration::from_secs(self.payment_deadline_secs)
    }

    pub fn print_deadline(&self) -> Duration {
        Duration::from_secs(self.print_deadline_secs)
    }
}
