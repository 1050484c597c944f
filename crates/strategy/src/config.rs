use serde::{Deserialize, Serialize};

use common::{Error, Result};

use crate::decision::{DecisionEngine, ShortEntries};
use crate::dispatcher::BarDispatcher;

/// Immutable parameter set for one strategy run.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Parameters {
    pub rsi_period: usize,
    /// Long entry when RSI is below this level.
    pub rsi_low: f64,
    /// Documented short-entry level (RSI above this).
    pub rsi_high: f64,
    /// Reversion level that closes an open position.
    pub rsi_mid: f64,
    pub sma_period: usize,
    pub atr_period: usize,
    /// Fractional gain that closes a position (0.02 = 2%).
    pub profit_target: f64,
    /// Fractional loss that closes a position (0.02 = 2%).
    pub stop_loss: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            rsi_period: 11,
            rsi_low: 40.0,
            rsi_high: 56.0,
            rsi_mid: 71.0,
            sma_period: 130,
            atr_period: 17,
            profit_target: 0.02,
            stop_loss: 0.02,
        }
    }
}

#[allow(clippy::too_many_arguments)]
const fn preset(
    rsi_period: usize,
    rsi_low: f64,
    rsi_high: f64,
    rsi_mid: f64,
    sma_period: usize,
    atr_period: usize,
    profit_target: f64,
    stop_loss: f64,
) -> Parameters {
    Parameters {
        rsi_period,
        rsi_low,
        rsi_high,
        rsi_mid,
        sma_period,
        atr_period,
        profit_target,
        stop_loss,
    }
}

/// Tuned parameter sets per instrument and bar interval.
pub const PRESETS: &[(&str, Parameters)] = &[
    ("EURUSD_5m", preset(17, 48.0, 70.0, 28.0, 100, 13, 0.01, 0.04)),
    ("BTCUSD_5m", preset(18, 49.0, 50.0, 75.0, 50, 9, 0.01, 0.01)),
    ("AAPL_5m", preset(11, 48.0, 59.0, 34.0, 230, 14, 0.01, 0.01)),
    ("EURUSD_15m", preset(10, 36.0, 60.0, 63.0, 160, 9, 0.03, 0.04)),
    ("BTCUSD_15m", preset(11, 40.0, 56.0, 71.0, 130, 17, 0.02, 0.02)),
    ("AAPL_15m", preset(15, 41.0, 52.0, 70.0, 230, 9, 0.03, 0.03)),
    ("EURUSD_4h", preset(13, 43.0, 69.0, 39.0, 230, 19, 0.02, 0.04)),
    ("BTCUSD_4h", preset(11, 33.0, 70.0, 72.0, 90, 15, 0.04, 0.02)),
    ("AAPL_4h", preset(16, 43.0, 84.0, 70.0, 70, 9, 0.04, 0.03)),
];

impl Parameters {
    /// Look up a tuned preset by name (case-insensitive), e.g. `"BTCUSD_15m"`.
    pub fn preset(name: &str) -> Option<Self> {
        PRESETS
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, params)| *params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rsi_period < 2 {
            return Err(Error::Config(format!(
                "rsi_period must be >= 2, got {}",
                self.rsi_period
            )));
        }
        for (name, period) in [("sma_period", self.sma_period), ("atr_period", self.atr_period)] {
            if period == 0 {
                return Err(Error::Config(format!("{name} must be >= 1")));
            }
        }
        for (name, level) in [
            ("rsi_low", self.rsi_low),
            ("rsi_high", self.rsi_high),
            ("rsi_mid", self.rsi_mid),
        ] {
            if !(0.0..=100.0).contains(&level) {
                return Err(Error::Config(format!(
                    "{name} must be within [0, 100], got {level}"
                )));
            }
        }
        for (name, pct) in [
            ("profit_target", self.profit_target),
            ("stop_loss", self.stop_loss),
        ] {
            if !(pct > 0.0 && pct < 1.0) {
                return Err(Error::Config(format!(
                    "{name} must be within (0, 1), got {pct}"
                )));
            }
        }
        Ok(())
    }
}

/// Per-field overrides applied on top of a preset or the defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParamOverrides {
    pub rsi_period: Option<usize>,
    pub rsi_low: Option<f64>,
    pub rsi_high: Option<f64>,
    pub rsi_mid: Option<f64>,
    pub sma_period: Option<usize>,
    pub atr_period: Option<usize>,
    pub profit_target: Option<f64>,
    pub stop_loss: Option<f64>,
}

impl ParamOverrides {
    fn apply(&self, base: Parameters) -> Parameters {
        Parameters {
            rsi_period: self.rsi_period.unwrap_or(base.rsi_period),
            rsi_low: self.rsi_low.unwrap_or(base.rsi_low),
            rsi_high: self.rsi_high.unwrap_or(base.rsi_high),
            rsi_mid: self.rsi_mid.unwrap_or(base.rsi_mid),
            sma_period: self.sma_period.unwrap_or(base.sma_period),
            atr_period: self.atr_period.unwrap_or(base.atr_period),
            profit_target: self.profit_target.unwrap_or(base.profit_target),
            stop_loss: self.stop_loss.unwrap_or(base.stop_loss),
        }
    }
}

/// Sizing settings handed to the execution client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SizerConfig {
    #[serde(default = "default_sizer_name")]
    pub name: String,
    #[serde(default = "default_sizer_lots")]
    pub lots: f64,
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self {
            name: default_sizer_name(),
            lots: default_sizer_lots(),
        }
    }
}

fn default_sizer_name() -> String {
    "FixedLotSizer".to_string()
}

fn default_sizer_lots() -> f64 {
    0.10
}

/// Strategy config file (TOML).
///
/// Example `config/strategy.toml`:
/// ```toml
/// name = "BTC rollercoaster 15m"
/// pair = "BTCUSD"
/// preset = "BTCUSD_15m"
///
/// [params]
/// stop_loss = 0.03
///
/// [sizer]
/// name = "FixedLotSizer"
/// lots = 0.10
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    /// Human-readable name shown in logs.
    pub name: String,
    /// Trading pair, e.g. "BTCUSD".
    pub pair: String,
    /// Named preset to start from; defaults apply when absent.
    #[serde(default)]
    pub preset: Option<String>,
    /// Opt in to entering shorts on the overbought-below-trend condition.
    #[serde(default)]
    pub short_entries: bool,
    #[serde(default)]
    pub params: ParamOverrides,
    #[serde(default)]
    pub sizer: SizerConfig,
}

impl StrategyFileConfig {
    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read strategy config at '{path}': {e}"))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Final parameter set: preset (or defaults), then overrides, validated.
    pub fn parameters(&self) -> Result<Parameters> {
        let base = match &self.preset {
            Some(name) => Parameters::preset(name)
                .ok_or_else(|| Error::Config(format!("Unknown preset '{name}'")))?,
            None => Parameters::default(),
        };
        let params = self.params.apply(base);
        params.validate()?;
        Ok(params)
    }

    /// Build the dispatcher described by this file.
    pub fn build_dispatcher(&self) -> Result<BarDispatcher> {
        let short_entries = if self.short_entries {
            ShortEntries::Enabled
        } else {
            ShortEntries::Disabled
        };
        let engine = DecisionEngine::new(self.parameters()?).with_short_entries(short_entries);
        Ok(BarDispatcher::with_engine(engine))
    }
}
