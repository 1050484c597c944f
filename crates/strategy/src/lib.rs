pub mod config;
pub mod decision;
pub mod dispatcher;
pub mod indicators;
pub mod position;
pub mod runner;

pub use config::{Parameters, SizerConfig, StrategyFileConfig, PRESETS};
pub use decision::{DecisionEngine, ExitReason, ShortEntries};
pub use dispatcher::BarDispatcher;
pub use indicators::{IndicatorBank, IndicatorState};
pub use position::PositionTracker;
pub use runner::StrategyRunner;
