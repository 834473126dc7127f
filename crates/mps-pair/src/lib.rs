//! Phase-pair identity and pair-indexed model tables.
//!
//! A [`PairKey`] names an interaction; the [`PairRegistry`] holds exactly one
//! [`Pair`] per distinct key; [`generate_pairs_and_sub_models`] fills a
//! [`SubModelTable`] of any model kind from a configuration section while
//! sharing the registry's deduplication.

mod factory;
mod generate;
mod key;
mod pair;
mod registry;
mod table;

pub use factory::{BuildContext, ModelCtor, ModelFactory};
pub use generate::{generate_pairs, generate_pairs_and_sub_models};
pub use key::PairKey;
pub use pair::{Pair, PairContext, PhaseRef};
pub use registry::PairRegistry;
pub use table::SubModelTable;
