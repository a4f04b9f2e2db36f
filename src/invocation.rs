// Strategy invocation adapter
//
// The only path by which an external decision reaches the environment. Whatever the
// strategy does (errors, panics, out-of-range indices, 180° turns) the caller gets a
// legal direction back.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use crate::food::Food;
use crate::snake::Snake;
use crate::strategy::Strategy;
use crate::types::Direction;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The strategy returned an error or panicked
    RuntimeFailure(String),
    /// The strategy returned an index outside the current valid actions
    IllegalMove(i32),
}

/// How the action for one snake on one tick was obtained
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The strategy's own answer, already legal
    Chosen(Direction),
    /// No valid actions (dead snake), heading kept without asking the strategy
    KeptHeading(Direction),
    /// A uniformly random valid action substituted for a bad answer
    Fallback {
        direction: Direction,
        reason: FallbackReason,
    },
}

impl Decision {
    pub fn direction(&self) -> Direction {
        match self {
            Decision::Chosen(d) | Decision::KeptHeading(d) => *d,
            Decision::Fallback { direction, .. } => *direction,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Decision::Chosen(_) => "chosen",
            Decision::KeptHeading(_) => "kept_heading",
            Decision::Fallback { .. } => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Decision::Fallback { .. })
    }
}

thread_local! {
    static IN_STRATEGY: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running strategy code until dropped
struct StrategyScope {
    previous: bool,
}

impl StrategyScope {
    fn enter() -> Self {
        StrategyScope {
            previous: IN_STRATEGY.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for StrategyScope {
    fn drop(&mut self) {
        let previous = self.previous;
        IN_STRATEGY.with(|flag| flag.set(previous));
    }
}

/// True while the current thread is inside a strategy call made by `decide`
pub fn in_strategy_call() -> bool {
    IN_STRATEGY.with(|flag| flag.get())
}

/// Routes panics raised inside strategy calls to the `log` facade
///
/// `decide` already reports every caught panic as a fallback, so the default
/// "thread panicked" line on stderr is only kept for panics elsewhere.
pub fn install_strategy_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if in_strategy_call() {
            debug!("Strategy panic contained: {}", info);
        } else {
            default_hook(info);
        }
    }));
}

/// Asks `strategy` for `me`'s next action and enforces legality
pub fn decide<R: Rng + ?Sized>(
    strategy: &mut dyn Strategy,
    me: &Snake,
    opponent: Option<&Snake>,
    food: &[Food],
    rng: &mut R,
) -> Decision {
    let valid = me.valid_actions();
    if valid.is_empty() {
        return Decision::KeptHeading(me.direction());
    }

    let grid = me.grid();
    let answer = {
        let _scope = StrategyScope::enter();
        panic::catch_unwind(AssertUnwindSafe(|| {
            strategy.choose_action(me, opponent, food, grid.width, grid.height)
        }))
    };

    let reason = match answer {
        Ok(Ok(index)) => match Direction::from_index(index) {
            Some(d) if valid.contains(&d) => return Decision::Chosen(d),
            _ => FallbackReason::IllegalMove(index),
        },
        Ok(Err(message)) => FallbackReason::RuntimeFailure(message),
        Err(payload) => FallbackReason::RuntimeFailure(panic_message(payload.as_ref())),
    };

    let direction = valid[rng.random_range(0..valid.len())];
    warn!(
        "Strategy answer replaced with random move {} ({:?})",
        direction, reason
    );
    Decision::Fallback { direction, reason }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
