//! Command implementations.

pub mod convert;
pub mod inspect;

use bodysync_core::ReconcileConfig;

use crate::cli::ReconcileArgs;
use crate::config::Config;

/// Merge command-line reconciliation flags over the config file defaults.
pub fn resolve_reconcile_config(args: &ReconcileArgs, config: &Config) -> ReconcileConfig {
    let blood_pressure = config
        .features
        .iter()
        .chain(&args.features)
        .any(|f| f.eq_ignore_ascii_case("BLOOD_PRESSURE"));
    ReconcileConfig {
        height: args.height.or(config.height),
        accept_unclassified: args.accept_unclassified || config.accept_unclassified,
        blood_pressure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(features: &[&str], height: Option<f64>) -> ReconcileArgs {
        ReconcileArgs {
            height,
            features: features.iter().map(|s| s.to_string()).collect(),
            accept_unclassified: false,
        }
    }

    #[test]
    fn test_cli_height_overrides_config() {
        let config = Config {
            height: Some(1.70),
            ..Config::default()
        };
        let resolved = resolve_reconcile_config(&args(&[], Some(1.80)), &config);
        assert_eq!(resolved.height, Some(1.80));
    }

    #[test]
    fn test_feature_from_either_side_enables_bp() {
        let from_cli = resolve_reconcile_config(&args(&["BLOOD_PRESSURE"], None), &Config::default());
        assert!(from_cli.blood_pressure);

        let config = Config {
            features: vec!["blood_pressure".to_string()],
            ..Config::default()
        };
        let from_config = resolve_reconcile_config(&args(&[], None), &config);
        assert!(from_config.blood_pressure);

        let neither = resolve_reconcile_config(&args(&[], None), &Config::default());
        assert!(!neither.blood_pressure);
    }
}
