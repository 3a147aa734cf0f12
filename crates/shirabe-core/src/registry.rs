//! Format detection and dictionary construction.
//!
//! Every [`Implementation`] scores a descriptor with a [`TestResult`]; the
//! registry picks the implementation with the strictly highest positive
//! confidence. Ties keep the implementation registered first.
//!
//! Confidence values are not normalized across implementations. A specialized
//! dialect of a general format may report more than the general format's
//! [`Implementation::max_confidence`] to win for descriptors both accept.

use std::sync::Arc;

use crate::dictionary::{Dictionary, LoadError};
use crate::error::RegistryError;

/// Confidence meaning "never this format".
pub const ZERO_CONFIDENCE: f32 = 0.0;

/// Outcome of probing one descriptor against one format
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    confidence: f32,
    reason: String,
}

impl TestResult {
    pub fn new(confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            confidence,
            reason: reason.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::new(ZERO_CONFIDENCE, reason)
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A pluggable dictionary format
pub trait Implementation: Send + Sync {
    /// Format name, also the registration key
    fn name(&self) -> &str;

    /// Highest confidence `is_instance` reports for a regular match
    fn max_confidence(&self) -> f32;

    /// Score how likely `descriptor` is a dictionary of this format
    fn is_instance(&self, descriptor: &str) -> TestResult;

    /// Build the dictionary for `descriptor`
    fn create_instance(&self, descriptor: &str) -> Result<Box<dyn Dictionary>, LoadError>;
}

/// Set of known dictionary formats.
///
/// Registration takes `&mut self`, so formats are registered before the
/// registry is shared for detection.
#[derive(Default, Clone)]
pub struct DictionaryRegistry {
    implementations: Vec<Arc<dyn Implementation>>,
}

impl DictionaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a format. Registering a name that is already present does nothing.
    pub fn register(&mut self, implementation: Arc<dyn Implementation>) {
        if self
            .implementations
            .iter()
            .any(|known| known.name() == implementation.name())
        {
            tracing::debug!("Format {} already registered", implementation.name());
            return;
        }
        tracing::debug!("Registering dictionary format {}", implementation.name());
        self.implementations.push(implementation);
    }

    /// Registered formats in registration order
    pub fn implementations(&self) -> &[Arc<dyn Implementation>] {
        &self.implementations
    }

    /// Pick the implementation with the strictly highest confidence for `descriptor`.
    pub fn detect(&self, descriptor: &str) -> Result<Arc<dyn Implementation>, RegistryError> {
        let mut best: Option<&Arc<dyn Implementation>> = None;
        let mut best_confidence = ZERO_CONFIDENCE;
        let mut reasons = Vec::with_capacity(self.implementations.len());

        for implementation in &self.implementations {
            let result = implementation.is_instance(descriptor);
            tracing::debug!(
                "{} scored {} for {}: {}",
                implementation.name(),
                result.confidence(),
                descriptor,
                result.reason()
            );
            if result.confidence() > best_confidence {
                best = Some(implementation);
                best_confidence = result.confidence();
            }
            reasons.push(format!("{}:{}", implementation.name(), result.reason()));
        }

        best.cloned().ok_or_else(|| RegistryError::FormatNotSupported {
            reasons: reasons.join("\n"),
        })
    }

    /// Detect the format of `descriptor` and instantiate the dictionary.
    pub fn create(&self, descriptor: &str) -> Result<Box<dyn Dictionary>, RegistryError> {
        let implementation = self.detect(descriptor)?;
        tracing::info!("Opening {} as {}", descriptor, implementation.name());
        implementation
            .create_instance(descriptor)
            .map_err(|source| RegistryError::Instantiation {
                implementation: implementation.name().to_string(),
                source,
            })
    }
}
