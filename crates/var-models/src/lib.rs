pub mod garch;
pub mod geopolitical;
pub mod historical;
pub mod monte_carlo;
pub mod parametric;
pub mod quantile;
pub mod regime;
pub mod signal;
pub mod vol;

pub use garch::Garch11;
pub use geopolitical::{geopolitical_var, regime_parameters, RegimeParams};
pub use historical::historical_var;
pub use monte_carlo::monte_carlo_var;
pub use parametric::{ewma_var, parametric_var};
pub use quantile::quantile_regression_var;
pub use regime::classify_regimes;
pub use signal::build_signal_index;
pub use vol::rolling_volatility;
