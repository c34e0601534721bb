//! Async wrapper around [`DeckOptimizer`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every request on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! the catalog and the deck analyzer are consulted.
//!
//! # Example
//!
//! ```no_run
//! use deck_optimizer::models::{Archetype, Deck, DeckAnalysis, OptimizationConstraints};
//! use deck_optimizer::{AnalyzerError, AsyncDeckOptimizer, DeckOptimizer, InMemoryCatalog};
//!
//! #[tokio::main]
//! async fn main() {
//!     let analyzer = |_: &Deck| -> Result<DeckAnalysis, AnalyzerError> { Ok(DeckAnalysis::default()) };
//!     let optimizer = DeckOptimizer::builder(InMemoryCatalog::new(), analyzer)
//!         .build()
//!         .unwrap();
//!     let optimizer = AsyncDeckOptimizer::new(optimizer);
//!
//!     let deck = Deck::new("Sparks", Archetype::Aggro);
//!     let recommendation = optimizer
//!         .optimize_deck(deck, OptimizationConstraints::default())
//!         .await
//!         .unwrap();
//!     println!("{:?}", recommendation.budget_status);
//! }
//! ```

use std::sync::{Arc, Mutex};

use crate::analyzer::DeckAnalyzer;
use crate::catalog::CardCatalog;
use crate::error::{OptimizerError, Result};
use crate::models::{Deck, DeckRecommendation, OptimizationConstraints};
use crate::DeckOptimizer;

/// Async wrapper around [`DeckOptimizer`].
///
/// The optimizer is shared behind a [`Mutex`] because the catalog does not
/// have to be `Sync`: a DuckDB connection may move between threads but not
/// be used from two at once. The lock only guards the shared catalog; every
/// request still gets its own oracle and deck clones. Callers that need
/// parallel requests over one snapshot can build one optimizer per worker.
pub struct AsyncDeckOptimizer<C, A> {
    inner: Arc<Mutex<DeckOptimizer<C, A>>>,
}

impl<C, A> Clone for AsyncDeckOptimizer<C, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, A> AsyncDeckOptimizer<C, A>
where
    C: CardCatalog + Send + 'static,
    A: DeckAnalyzer + Send + 'static,
{
    pub fn new(optimizer: DeckOptimizer<C, A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(optimizer)),
        }
    }

    /// Run a sync optimizer operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DeckOptimizer<C, A>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let optimizer = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = optimizer
                .lock()
                .map_err(|_| OptimizerError::InvalidArgument("optimizer lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| OptimizerError::InvalidArgument(format!("Task join error: {e}")))?
    }

    pub async fn optimize_deck(
        &self,
        deck: Deck,
        constraints: OptimizationConstraints,
    ) -> Result<DeckRecommendation> {
        self.run(move |o| o.optimize_deck(&deck, &constraints)).await
    }

    pub async fn build_budget_deck(
        &self,
        max_budget: f64,
        constraints: OptimizationConstraints,
    ) -> Result<DeckRecommendation> {
        self.run(move |o| o.build_budget_deck(max_budget, &constraints))
            .await
    }

    pub async fn create_budget_variant(
        &self,
        deck: Deck,
        target_budget: f64,
    ) -> Result<DeckRecommendation> {
        self.run(move |o| o.create_budget_variant(&deck, target_budget))
            .await
    }
}
