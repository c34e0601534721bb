//! Deck optimization engine.
//!
//! Given a deck and a set of constraints, the engine finds the cards that
//! are pulling the least weight, searches a card catalog for better
//! substitutes, fits the proposed changes to a budget and explains the
//! result as a [`DeckRecommendation`](models::DeckRecommendation).
//!
//! Card data and prices come from a [`CardCatalog`]; whole-deck scoring
//! comes from an external [`DeckAnalyzer`]. Both are consumed, never owned.
//!
//! # Quick start
//!
//! ```no_run
//! use deck_optimizer::models::{Archetype, Deck, DeckAnalysis, OptimizationConstraints};
//! use deck_optimizer::{AnalyzerError, DeckOptimizer, InMemoryCatalog};
//!
//! let catalog = InMemoryCatalog::new();
//! let analyzer = |_: &Deck| -> Result<DeckAnalysis, AnalyzerError> { Ok(DeckAnalysis::default()) };
//! let optimizer = DeckOptimizer::builder(catalog, analyzer).build().unwrap();
//!
//! let deck = Deck::new("Sparks", Archetype::Aggro);
//! let constraints = OptimizationConstraints::default().with_budget(50.0);
//! let recommendation = optimizer.optimize_deck(&deck, &constraints).unwrap();
//! for line in &recommendation.reasoning {
//!     println!("{}", line);
//! }
//! ```

pub mod alternatives;
pub mod analyzer;
#[cfg(feature = "async")]
pub mod async_client;
pub mod budget;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod cost;
pub mod deadline;
pub mod error;
pub mod evaluator;
pub mod impact;
pub mod models;
pub mod optimizer;
pub mod oracle;
pub mod search;
pub mod selector;
pub mod sql_builder;
pub mod synergy;

pub use analyzer::DeckAnalyzer;
#[cfg(feature = "async")]
pub use async_client::AsyncDeckOptimizer;
pub use catalog::{CardCatalog, CardFilter, DuckDbCatalog, InMemoryCatalog};
pub use config::OptimizerConfig;
pub use connection::Connection;
pub use deadline::{CancellationToken, Deadline};
pub use error::{AnalyzerError, OptimizerError, Result};
pub use oracle::CardOracle;
pub use sql_builder::SqlBuilder;

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// DeckOptimizerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`DeckOptimizer`].
///
/// Use [`DeckOptimizer::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](DeckOptimizerBuilder::build).
pub struct DeckOptimizerBuilder<C, A> {
    catalog: C,
    analyzer: A,
    config: OptimizerConfig,
    timeout: Option<Duration>,
}

impl<C: CardCatalog, A: DeckAnalyzer> DeckOptimizerBuilder<C, A> {
    /// Replace the default tuning parameters.
    pub fn config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Default wall-clock limit applied to every request.
    ///
    /// Requests made through the `*_with_deadline` methods use their own
    /// deadline instead. No limit by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate the configuration and build the optimizer.
    pub fn build(self) -> Result<DeckOptimizer<C, A>> {
        self.config.validate()?;
        Ok(DeckOptimizer {
            catalog: self.catalog,
            analyzer: self.analyzer,
            config: self.config,
            timeout: self.timeout,
        })
    }
}

// ---------------------------------------------------------------------------
// DeckOptimizer
// ---------------------------------------------------------------------------

/// The main entry point of the engine.
///
/// Holds no per-request state: every call builds its own [`CardOracle`] and
/// deck clones, so one optimizer can serve any number of requests. The
/// request operations live in [`optimizer`].
pub struct DeckOptimizer<C, A> {
    catalog: C,
    analyzer: A,
    config: OptimizerConfig,
    timeout: Option<Duration>,
}

impl<C: CardCatalog, A: DeckAnalyzer> DeckOptimizer<C, A> {
    /// Create a new builder over a catalog and an analyzer.
    pub fn builder(catalog: C, analyzer: A) -> DeckOptimizerBuilder<C, A> {
        DeckOptimizerBuilder {
            catalog,
            analyzer,
            config: OptimizerConfig::default(),
            timeout: None,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// A fresh deadline from the configured default timeout.
    pub fn default_deadline(&self) -> Deadline {
        match self.timeout {
            Some(timeout) => Deadline::after(timeout),
            None => Deadline::none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl<C, A> fmt::Display for DeckOptimizer<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeckOptimizer(iterations={}, ceiling_ratio={}, timeout={:?})",
            self.config.budget_iterations, self.config.per_card_ceiling_ratio, self.timeout
        )
    }
}
