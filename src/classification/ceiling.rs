//! Ceiling resolution from reported cloud layers

use crate::error::MetricsError;
use crate::models::{Ceiling, CloudLayer};

/// Find the lowest layer that forms a ceiling (BKN, OVC or VV).
///
/// Layers are scanned in full; the input does not need to be sorted by altitude.
/// A ceiling layer whose altitude cannot be expressed in feet is rejected.
pub fn resolve_ceiling(layers: &[CloudLayer]) -> Result<Ceiling, MetricsError> {
    let heights = layers
        .iter()
        .filter(|layer| layer.coverage.forms_ceiling())
        .map(|layer| {
            layer
                .altitude_feet()
                .ok_or_else(|| MetricsError::invalid("ceiling", f64::from(layer.altitude)))
        })
        .collect::<Result<Vec<u32>, _>>()?;

    Ok(heights
        .into_iter()
        .min()
        .map_or(Ceiling::Unlimited, |feet| Ceiling::Limited { feet }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::classify_by_ceiling;
    use crate::models::{CEILING_UNLIMITED_FT, CloudCoverage, FlightRules};

    fn layer(coverage: CloudCoverage, altitude: u32) -> CloudLayer {
        CloudLayer::new(coverage, altitude)
    }

    #[test]
    fn test_lowest_qualifying_layer_wins() {
        let layers = vec![
            layer(CloudCoverage::Scattered, 25),
            layer(CloudCoverage::Broken, 10),
            layer(CloudCoverage::Overcast, 5),
        ];
        assert_eq!(resolve_ceiling(&layers), Ok(Ceiling::Limited { feet: 500 }));
    }

    #[test]
    fn test_first_match_is_not_assumed_lowest() {
        let layers = vec![
            layer(CloudCoverage::Overcast, 40),
            layer(CloudCoverage::Few, 2),
            layer(CloudCoverage::Broken, 12),
        ];
        assert_eq!(resolve_ceiling(&layers), Ok(Ceiling::Limited { feet: 1200 }));
    }

    #[test]
    fn test_few_and_scattered_do_not_form_ceiling() {
        let layers = vec![layer(CloudCoverage::Few, 20), layer(CloudCoverage::Scattered, 30)];
        let ceiling = resolve_ceiling(&layers).unwrap();
        assert_eq!(ceiling, Ceiling::Unlimited);
        assert_eq!(ceiling.altitude_feet(), CEILING_UNLIMITED_FT);
        assert_eq!(
            classify_by_ceiling(f64::from(ceiling.altitude_feet())),
            Ok(FlightRules::Vfr)
        );
    }

    #[test]
    fn test_clear_sky_is_unlimited() {
        let ceiling = resolve_ceiling(&[]).unwrap();
        assert!(ceiling.is_unlimited());
        assert_eq!(
            classify_by_ceiling(f64::from(ceiling.altitude_feet())),
            Ok(FlightRules::Vfr)
        );
    }

    #[test]
    fn test_vertical_visibility_forms_ceiling() {
        let layers = vec![layer(CloudCoverage::VerticalVisibility, 2)];
        assert_eq!(resolve_ceiling(&layers), Ok(Ceiling::Limited { feet: 200 }));
    }

    #[test]
    fn test_input_is_left_untouched() {
        let layers = vec![
            layer(CloudCoverage::Overcast, 30),
            layer(CloudCoverage::Broken, 8),
        ];
        let before = layers.clone();
        resolve_ceiling(&layers).unwrap();
        assert_eq!(layers, before);
    }

    #[test]
    fn test_overflowing_ceiling_altitude_is_invalid() {
        let layers = vec![
            layer(CloudCoverage::Broken, 50),
            layer(CloudCoverage::Overcast, 42_949_673),
        ];
        assert_eq!(
            resolve_ceiling(&layers),
            Err(MetricsError::invalid("ceiling", 42_949_673.0))
        );
    }

    #[test]
    fn test_overflowing_non_ceiling_layer_is_ignored() {
        let layers = vec![
            layer(CloudCoverage::Few, 42_949_673),
            layer(CloudCoverage::Broken, 50),
        ];
        assert_eq!(resolve_ceiling(&layers), Ok(Ceiling::Limited { feet: 5000 }));
    }
}
