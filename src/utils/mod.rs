pub mod export;
pub mod parlay;
pub mod season;
