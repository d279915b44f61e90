pub mod config;
pub mod score;
pub mod simulate;
pub mod tiers;
