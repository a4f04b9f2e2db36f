// Library exports for the snake gauntlet
// This allows the runner, the replay tool and the integration tests to share the engine

pub mod config;
pub mod error;
pub mod food;
pub mod game;
pub mod grid;
pub mod invocation;
pub mod leaderboard;
pub mod match_log;
pub mod provider;
pub mod replay;
pub mod sandbox;
pub mod series;
pub mod snake;
pub mod strategy;
pub mod tournament;
pub mod types;
pub mod vault;
