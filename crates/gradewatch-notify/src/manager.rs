// crates/gradewatch-notify/src/manager.rs
// ============================================================================
// Module: Notification Manager
// Description: Resolves the active provider set and fans a message out to it.
// Purpose: The configuration-aware wrapper around gradewatch_core's fan-out algorithm.
// Dependencies: gradewatch-core
// ============================================================================

//! ## Overview
//! [`NotificationManager`] owns the provider set and exposes a single
//! `dispatch` call, but the ordering/enrichment algorithm itself lives in
//! [`gradewatch_core::runtime::notify_manager`] so it can be unit-tested
//! against fakes without any concrete transport.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gradewatch_core::core::NotificationMessage;
use gradewatch_core::interfaces::NotificationProvider;
use gradewatch_core::interfaces::NotifyResults;
use gradewatch_core::runtime::notify_manager;

// ============================================================================
// SECTION: Manager
// ============================================================================

/// Owns the set of providers whose `available()` returned true at startup.
pub struct NotificationManager {
    providers: Vec<Box<dyn NotificationProvider>>,
}

/// Builds a [`NotificationManager`] from a list of candidate providers,
/// discarding any that report themselves unavailable.
pub struct NotificationManagerBuilder {
    candidates: Vec<Box<dyn NotificationProvider>>,
}

impl NotificationManagerBuilder {
    /// Starts with an empty candidate list.
    #[must_use]
    pub fn new() -> Self {
        Self { candidates: Vec::new() }
    }

    /// Registers a candidate provider. Availability is checked at [`Self::build`].
    #[must_use]
    pub fn with_provider(mut self, provider: Box<dyn NotificationProvider>) -> Self {
        self.candidates.push(provider);
        self
    }

    /// Filters candidates to the available set and returns the manager.
    #[must_use]
    pub fn build(self) -> NotificationManager {
        let providers = self.candidates.into_iter().filter(|provider| provider.available()).collect();
        NotificationManager { providers }
    }
}

impl Default for NotificationManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    /// Names of the providers in the active set, for startup logging.
    #[must_use]
    pub fn active_provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    /// The active provider set, for callers driving
    /// [`gradewatch_core::runtime::orchestrator::run_cycle`] directly.
    #[must_use]
    pub fn providers(&self) -> &[Box<dyn NotificationProvider>] {
        &self.providers
    }

    /// Fans `message` out to the active provider set per §4.E.
    #[must_use]
    pub fn dispatch(&self, message: NotificationMessage) -> NotifyResults {
        notify_manager::dispatch(&self.providers, message)
    }
}
