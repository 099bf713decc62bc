//! Runtime feature-flag evaluation for route gates.
//!
//! A route with a [`RuntimeGate`] is eligible only when the injected
//! [`RuntimeSource`] says its flag is enabled for the request. Every source
//! here is deterministic in the request's `random_value`.

use crate::RequestAttributes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

/// Denominator of a [`FractionalPercent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Denominator {
    /// 100
    #[default]
    Hundred,
    /// 10,000
    TenThousand,
    /// 1,000,000
    Million,
}

impl Denominator {
    /// The numeric value.
    #[must_use]
    pub fn value(self) -> u64 {
        match self {
            Self::Hundred => 100,
            Self::TenThousand => 10_000,
            Self::Million => 1_000_000,
        }
    }
}

/// A fraction `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FractionalPercent {
    /// Numerator. Values above the denominator saturate to 100%.
    pub numerator: u32,
    /// Denominator, `HUNDRED` when omitted.
    #[serde(default)]
    pub denominator: Denominator,
}

impl FractionalPercent {
    /// Create a fractional percent.
    #[must_use]
    pub fn new(numerator: u32, denominator: Denominator) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Active iff `random_value mod D < N`.
    ///
    /// ```
    /// use routa::{Denominator, FractionalPercent};
    ///
    /// let half = FractionalPercent::new(50, Denominator::Hundred);
    /// assert!(half.evaluate(49));
    /// assert!(!half.evaluate(50));
    /// assert!(half.evaluate(149));
    /// ```
    #[must_use]
    pub fn evaluate(&self, random_value: u64) -> bool {
        let denominator = self.denominator.value();
        random_value % denominator < u64::from(self.numerator).min(denominator)
    }
}

/// A route's runtime gate: a flag key and its default fraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeGate {
    key: String,
    default_value: FractionalPercent,
}

impl RuntimeGate {
    /// Create a gate.
    #[must_use]
    pub fn new(key: impl Into<String>, default_value: FractionalPercent) -> Self {
        Self {
            key: key.into(),
            default_value,
        }
    }

    /// The flag key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The default fraction.
    #[must_use]
    pub fn default_value(&self) -> FractionalPercent {
        self.default_value
    }
}

/// Decides whether a runtime gate is open for a request.
///
/// Injected into the matching engine so a live deployment and the
/// verification harness can use different flag services.
pub trait RuntimeSource: Send + Sync + Debug {
    /// Whether `gate` is enabled for `request`.
    fn feature_enabled(&self, gate: &RuntimeGate, request: &RequestAttributes) -> bool;
}

/// Evaluates every gate against its own default fraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRuntime;

impl RuntimeSource for DefaultRuntime {
    fn feature_enabled(&self, gate: &RuntimeGate, request: &RequestAttributes) -> bool {
        gate.default_value.evaluate(request.random_value())
    }
}

/// Per-key fraction overrides, falling back to each gate's default.
#[derive(Debug, Clone, Default)]
pub struct StaticRuntime {
    overrides: HashMap<String, FractionalPercent>,
}

impl StaticRuntime {
    /// Create an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the fraction for `key`.
    #[must_use]
    pub fn with_override(mut self, key: impl Into<String>, value: FractionalPercent) -> Self {
        self.overrides.insert(key.into(), value);
        self
    }
}

impl RuntimeSource for StaticRuntime {
    fn feature_enabled(&self, gate: &RuntimeGate, request: &RequestAttributes) -> bool {
        self.overrides
            .get(gate.key())
            .copied()
            .unwrap_or(gate.default_value)
            .evaluate(request.random_value())
    }
}
