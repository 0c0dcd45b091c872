// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mapping of document confidence statistics to a quality tier.

use scanwerk_core::{ConfidenceData, QualityRating, QualityReport};

/// Documents averaging below this are worth re-running with enhancement.
pub const ENHANCEMENT_RECOMMENDED_BELOW: f64 = 0.70;

/// (minimum average confidence, maximum low-confidence ratio, rating), first
/// match wins.
const RULES: [(f64, f64, QualityRating); 4] = [
    (0.90, 0.10, QualityRating::Excellent),
    (0.80, 0.20, QualityRating::Good),
    (0.60, 0.40, QualityRating::Fair),
    (0.40, 1.00, QualityRating::Poor),
];

pub fn classify(average_confidence: f64, low_confidence_ratio: f64) -> QualityRating {
    RULES
        .iter()
        .find(|(min_avg, max_ratio, _)| {
            average_confidence >= *min_avg && low_confidence_ratio <= *max_ratio
        })
        .map(|(_, _, rating)| *rating)
        .unwrap_or(QualityRating::RequiresReview)
}

pub fn enhancement_recommended(average_confidence: f64) -> bool {
    average_confidence < ENHANCEMENT_RECOMMENDED_BELOW
}

/// Rate a finished confidence record.
pub fn build_report(confidence_data: ConfidenceData) -> QualityReport {
    let average_confidence = confidence_data.average_confidence;
    let low_confidence_ratio = confidence_data.low_confidence_ratio();
    let quality_rating = classify(average_confidence, low_confidence_ratio);
    QualityReport {
        quality_rating,
        average_confidence,
        low_confidence_ratio,
        requires_manual_review: quality_rating.requires_manual_review(),
        enhancement_recommended: enhancement_recommended(average_confidence),
        confidence_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_table() {
        assert_eq!(classify(0.95, 0.05), QualityRating::Excellent);
        assert_eq!(classify(0.85, 0.15), QualityRating::Good);
        assert_eq!(classify(0.75, 0.25), QualityRating::Fair);
        assert_eq!(classify(0.50, 0.90), QualityRating::Poor);
        assert_eq!(classify(0.30, 0.50), QualityRating::RequiresReview);
    }

    #[test]
    fn high_average_with_many_rejects_falls_through() {
        // Too many low-confidence blocks for Excellent/Good/Fair.
        assert_eq!(classify(0.95, 0.45), QualityRating::Poor);
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(classify(0.90, 0.10), QualityRating::Excellent);
        assert_eq!(classify(0.40, 1.0), QualityRating::Poor);
        assert_eq!(classify(0.3999, 0.0), QualityRating::RequiresReview);
    }

    #[test]
    fn report_flags() {
        let data = ConfidenceData {
            average_confidence: 0.30,
            total_text_blocks: 4,
            low_confidence_count: 2,
            ..Default::default()
        };
        let report = build_report(data);
        assert_eq!(report.quality_rating, QualityRating::RequiresReview);
        assert!(report.requires_manual_review);
        assert!(report.enhancement_recommended);
        assert_eq!(report.low_confidence_ratio, 0.5);

        let data = ConfidenceData {
            average_confidence: 0.92,
            total_text_blocks: 20,
            low_confidence_count: 1,
            ..Default::default()
        };
        let report = build_report(data);
        assert_eq!(report.quality_rating, QualityRating::Excellent);
        assert!(!report.requires_manual_review);
        assert!(!report.enhancement_recommended);
    }

    #[test]
    fn enhancement_recommendation_is_independent_of_rating() {
        // Fair, yet below the recommendation cut-off.
        assert_eq!(classify(0.65, 0.1), QualityRating::Fair);
        assert!(enhancement_recommended(0.65));
        assert!(!enhancement_recommended(0.70));
    }
}
