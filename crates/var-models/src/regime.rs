use risk_core::{Regime, RegimeThresholds, Result, RiskError};

use crate::vol::rolling_volatility;

/// Classify every observation into Calm / Tension / Crisis.
///
/// The decision combines the risk-signal level with rolling annualized
/// volatility (window `vol_window`, percent). The two rules overlap, so they
/// are applied as a strict cascade with Crisis checked first; anything that
/// matches neither rule, including warm-up dates where the volatility window
/// is not populated, is Calm. The output covers every input date.
pub fn classify_regimes(
    returns: &[f64],
    signal: &[f64],
    thresholds: &RegimeThresholds,
    vol_window: usize,
) -> Result<Vec<Regime>> {
    if returns.is_empty() {
        return Err(RiskError::InvalidInput("empty return series".to_string()));
    }
    if returns.len() != signal.len() {
        return Err(RiskError::InvalidInput(format!(
            "returns and signal have different lengths: {} vs {}",
            returns.len(),
            signal.len()
        )));
    }

    let vol = rolling_volatility(returns, vol_window);

    let regimes = signal
        .iter()
        .zip(vol.iter())
        .map(|(&s, &v)| classify_one(s, v, thresholds))
        .collect();
    Ok(regimes)
}

fn classify_one(signal: f64, vol: Option<f64>, t: &RegimeThresholds) -> Regime {
    let vol_crisis = vol.map_or(false, |v| v >= t.vol_crisis);
    let vol_tension = vol.map_or(false, |v| v >= t.vol_tension && v < t.vol_crisis);

    if signal >= t.signal_crisis || vol_crisis {
        Regime::Crisis
    } else if (signal >= t.signal_tension && signal < t.signal_crisis) || vol_tension {
        Regime::Tension
    } else {
        Regime::Calm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_priority_is_crisis_first() {
        let t = RegimeThresholds::default();
        // Signal says crisis even though vol says tension.
        assert_eq!(classify_one(300.0, Some(25.0), &t), Regime::Crisis);
        // Vol says crisis even though signal is calm.
        assert_eq!(classify_one(100.0, Some(35.0), &t), Regime::Crisis);
        assert_eq!(classify_one(180.0, Some(5.0), &t), Regime::Tension);
        assert_eq!(classify_one(100.0, Some(25.0), &t), Regime::Tension);
        assert_eq!(classify_one(100.0, Some(10.0), &t), Regime::Calm);
    }

    #[test]
    fn warm_up_defaults_to_calm() {
        let t = RegimeThresholds::default();
        assert_eq!(classify_one(100.0, None, &t), Regime::Calm);
        // A hot signal still escalates before the vol window fills.
        assert_eq!(classify_one(260.0, None, &t), Regime::Crisis);
    }

    #[test]
    fn every_observation_is_labeled() {
        let returns: Vec<f64> = (0..100).map(|i| 0.02 * ((i % 5) as f64 - 2.0)).collect();
        let signal = vec![120.0; 100];
        let regimes =
            classify_regimes(&returns, &signal, &RegimeThresholds::default(), 30).unwrap();
        assert_eq!(regimes.len(), returns.len());
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = classify_regimes(&[0.01], &[100.0, 100.0], &RegimeThresholds::default(), 30);
        assert!(err.is_err());
    }
}
