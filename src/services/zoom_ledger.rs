// Floatshell Zoom Ledger
// Per-domain multiplicative zoom offsets on top of one process-wide default factor.
// Pure data and arithmetic, no I/O.

use std::collections::HashMap;

use url::Url;

pub const MIN_OFFSET: f64 = 0.3;
pub const MAX_OFFSET: f64 = 3.0;
pub const MIN_DEFAULT_FACTOR: f64 = 0.5;
pub const MAX_DEFAULT_FACTOR: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.1;

/// Trait defining the zoom ledger interface.
pub trait ZoomLedgerTrait {
    fn get_offset(&self, domain: &str) -> f64;
    fn set_offset(&mut self, domain: &str, value: f64) -> f64;
    fn clear_offset(&mut self, domain: &str) -> bool;
    fn effective_zoom(&self, domain: &str) -> f64;
    fn default_factor(&self) -> f64;
    fn set_default_factor(&mut self, value: f64) -> f64;
    fn step_offset(&mut self, domain: &str, delta: f64) -> f64;
}

/// In-memory zoom ledger.
#[derive(Debug, Clone)]
pub struct ZoomLedger {
    default_factor: f64,
    offsets: HashMap<String, f64>,
}

impl ZoomLedger {
    pub fn new(default_factor: f64) -> Self {
        Self {
            default_factor: clamp_default_factor(default_factor),
            offsets: HashMap::new(),
        }
    }

    pub fn has_entry(&self, domain: &str) -> bool {
        self.offsets.contains_key(domain)
    }

    /// All stored entries, sorted by domain for stable checkpoints.
    pub fn entries(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> =
            self.offsets.iter().map(|(d, o)| (d.clone(), *o)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Replaces the ledger contents with a checkpoint. Values are re-clamped.
    pub fn restore(&mut self, entries: impl IntoIterator<Item = (String, f64)>) {
        self.offsets = entries
            .into_iter()
            .filter(|(domain, _)| !domain.is_empty())
            .map(|(domain, offset)| (domain, clamp_offset(offset)))
            .collect();
    }
}

impl Default for ZoomLedger {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ZoomLedgerTrait for ZoomLedger {
    fn get_offset(&self, domain: &str) -> f64 {
        self.offsets.get(domain).copied().unwrap_or(1.0)
    }

    /// Stores a clamped offset and returns the stored value.
    fn set_offset(&mut self, domain: &str, value: f64) -> f64 {
        let clamped = clamp_offset(value);
        self.offsets.insert(domain.to_string(), clamped);
        clamped
    }

    /// Removes the domain's entry. Returns whether one existed.
    fn clear_offset(&mut self, domain: &str) -> bool {
        self.offsets.remove(domain).is_some()
    }

    fn effective_zoom(&self, domain: &str) -> f64 {
        self.default_factor * self.get_offset(domain)
    }

    fn default_factor(&self) -> f64 {
        self.default_factor
    }

    fn set_default_factor(&mut self, value: f64) -> f64 {
        self.default_factor = clamp_default_factor(value);
        self.default_factor
    }

    /// Moves the domain's offset by `delta`, creating the entry on first use.
    fn step_offset(&mut self, domain: &str, delta: f64) -> f64 {
        let next = round_hundredths(self.get_offset(domain) + delta);
        self.set_offset(domain, next)
    }
}

fn clamp_offset(value: f64) -> f64 {
    if value.is_nan() {
        return 1.0;
    }
    value.clamp(MIN_OFFSET, MAX_OFFSET)
}

fn clamp_default_factor(value: f64) -> f64 {
    if value.is_nan() {
        return 1.0;
    }
    value.clamp(MIN_DEFAULT_FACTOR, MAX_DEFAULT_FACTOR)
}

// Keeps repeated 0.1 steps from accumulating binary drift.
fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Zoom factor as a whole percentage for display.
pub fn zoom_percentage(factor: f64) -> u32 {
    (factor * 100.0).round().max(0.0) as u32
}

/// Converts a percentage in [50, 200] to a default factor, clamping out-of-range input.
pub fn percentage_to_factor(percentage: u32) -> f64 {
    clamp_default_factor(percentage as f64 / 100.0)
}

/// Host name used as the ledger key, or `None` for urls without one (about:, data:, file:).
pub fn domain_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .filter(|h| !h.is_empty())
}
