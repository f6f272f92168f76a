//! XTE decision engine
//!
//! Decides whether a hypothesis is entailed by a text. A router picks the
//! tree edit distance model or the graph navigation model, a context veto
//! rejects pairs that cannot be entailed, and the chosen model decides with
//! a justification.

pub mod candidates;
pub mod context;
pub mod decision;
pub mod eval;
pub mod navigation;
pub mod pipeline;
pub mod router;
pub mod structural;
pub mod veto;

#[cfg(test)]
mod testing;

pub use context::EngineContext;
pub use decision::{Decision, EntailmentDecision, Model};
pub use eval::{Confusion, Evaluation};
pub use pipeline::{train, EntailmentPipeline};
