//! Built-in strategy implementations.
//!
//! - [`sma_crossover::SmaCrossover`]: dual simple-moving-average crossover
//! - [`price_level::PriceLevel`]: horizontal line / zone triggers

pub mod sma_crossover;
pub mod price_level;

pub use price_level::{LevelAction, PriceLevel, PriceLevelConfig};
pub use sma_crossover::{SmaCrossover, SmaCrossoverConfig};

pub const SMA_CROSSOVER: &str = "sma_crossover";
pub const PRICE_LEVEL: &str = "price_level";
