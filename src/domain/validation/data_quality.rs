use crate::domain::market::PricePoint;
use tracing::warn;

/// Centralized validator for provider price rows.
///
/// Rejects closes that cannot be real prices before they reach the scaler.
pub struct StrictPriceValidator;

impl StrictPriceValidator {
    /// Validates a single close. Returns true if valid, false otherwise.
    pub fn validate_point(ticker: &str, point: &PricePoint) -> bool {
        if !point.close.is_finite() {
            warn!(
                "Validation FAILED: {} has non-finite close on {}",
                ticker, point.date
            );
            return false;
        }
        if point.close <= 0.0 {
            warn!(
                "Validation FAILED: {} has non-positive close {} on {}",
                ticker, point.close, point.date
            );
            return false;
        }
        true
    }

    /// Drops invalid rows, keeping the rest in their original order.
    pub fn retain_valid(ticker: &str, points: Vec<PricePoint>) -> Vec<PricePoint> {
        let before = points.len();
        let kept: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| Self::validate_point(ticker, p))
            .collect();

        if kept.len() < before {
            warn!(
                "StrictPriceValidator: dropped {} of {} rows for {}",
                before - kept.len(),
                before,
                ticker
            );
        }
        kept
    }
}
