// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Thresholding of OCR detections and page/document confidence statistics.

use scanwerk_core::{ConfidenceData, Detection, EnhancementMetrics, TextBlock};
use tracing::debug;

/// Accepted text and confidence of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub page: u32,
    /// Text of detections scoring strictly above the threshold, in order.
    pub accepted: Vec<String>,
    /// Mean accepted score, 0.0 when nothing was accepted.
    pub confidence: f64,
}

/// Builds a [`ConfidenceData`] page by page for a single document run.
///
/// A detection is accepted when its score is strictly greater than the
/// threshold; everything else counts as low confidence. Document-level
/// average, min and max cover every detection, accepted or not.
#[derive(Debug, Clone)]
pub struct ConfidenceAggregator {
    threshold: f64,
    data: ConfidenceData,
}

impl ConfidenceAggregator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            data: ConfidenceData::default(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn record_enhancement(&mut self, metrics: EnhancementMetrics) {
        self.data.enhancement_metrics.push(metrics);
    }

    pub fn add_page(&mut self, page: u32, detections: &[Detection]) -> PageSummary {
        let mut accepted = Vec::new();
        let mut accepted_sum = 0.0;

        for detection in detections {
            self.data.text_blocks.push(TextBlock {
                page,
                text: detection.text.clone(),
                confidence: detection.score,
            });
            self.data.total_text_blocks += 1;

            if detection.score > self.threshold {
                accepted.push(detection.text.clone());
                accepted_sum += detection.score;
            } else {
                self.data.low_confidence_count += 1;
            }
        }

        let confidence = if accepted.is_empty() {
            0.0
        } else {
            accepted_sum / accepted.len() as f64
        };
        self.data.page_confidences.push(confidence);
        debug!(
            page,
            detections = detections.len(),
            accepted = accepted.len(),
            confidence,
            "Page aggregated"
        );

        PageSummary {
            page,
            accepted,
            confidence,
        }
    }

    /// Compute the summary statistics and hand back the finished record.
    pub fn finish(mut self) -> ConfidenceData {
        let scores = self.data.text_blocks.iter().map(|block| block.confidence);
        let (sum, min, max) = scores.fold(
            (0.0f64, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), s| (sum + s, min.min(s), max.max(s)),
        );
        let n = self.data.text_blocks.len();
        if n > 0 {
            self.data.average_confidence = sum / n as f64;
            self.data.min_confidence = min;
            self.data.max_confidence = max;
        } else {
            self.data.average_confidence = 0.0;
            self.data.min_confidence = 0.0;
            self.data.max_confidence = 0.0;
        }
        self.data
    }
}

/// Aggregate numbered pages of detections in one go.
pub fn aggregate<'a>(
    pages: impl IntoIterator<Item = (u32, &'a [Detection])>,
    threshold: f64,
) -> ConfidenceData {
    let mut aggregator = ConfidenceAggregator::new(threshold);
    for (page, detections) in pages {
        aggregator.add_page(page, detections);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::BoundingBox;

    fn det(text: &str, score: f64) -> Detection {
        Detection::new(BoundingBox::default(), text, score)
    }

    #[test]
    fn threshold_is_strict() {
        let mut agg = ConfidenceAggregator::new(0.3);
        let summary = agg.add_page(1, &[det("edge", 0.3), det("kept", 0.31)]);
        assert_eq!(summary.accepted, vec!["kept"]);
        let data = agg.finish();
        assert_eq!(data.low_confidence_count, 1);
        assert_eq!(data.total_text_blocks, 2);
    }

    #[test]
    fn counts_partition_the_detections_for_any_threshold() {
        let detections: Vec<_> = [0.0, 0.05, 0.3, 0.3, 0.5, 0.71, 0.9, 1.0]
            .iter()
            .map(|&s| det("w", s))
            .collect();
        for t in [0.0, 0.1, 0.3, 0.5, 0.7, 0.95, 1.0] {
            let data = aggregate([(1, detections.as_slice())], t);
            let low = detections.iter().filter(|d| d.score <= t).count();
            let accepted = detections.iter().filter(|d| d.score > t).count();
            assert_eq!(data.low_confidence_count, low, "t = {t}");
            assert_eq!(data.total_text_blocks - data.low_confidence_count, accepted);
            assert_eq!(low + accepted, detections.len());
        }
    }

    #[test]
    fn page_confidence_is_the_mean_of_accepted_scores() {
        let mut agg = ConfidenceAggregator::new(0.3);
        let summary = agg.add_page(3, &[det("a", 0.9), det("b", 0.7), det("c", 0.1)]);
        assert!((summary.confidence - 0.8).abs() < 1e-9);
        assert_eq!(summary.page, 3);
    }

    #[test]
    fn empty_page_has_zero_confidence() {
        let mut agg = ConfidenceAggregator::new(0.3);
        assert_eq!(agg.add_page(1, &[]).confidence, 0.0);
        assert_eq!(agg.add_page(2, &[det("low", 0.1)]).confidence, 0.0);
        assert_eq!(agg.finish().page_confidences, vec![0.0, 0.0]);
    }

    #[test]
    fn document_statistics_cover_rejected_blocks_too() {
        let page1 = [det("a", 0.9), det("b", 0.1)];
        let page2 = [det("c", 0.5)];
        let data = aggregate([(1, &page1[..]), (2, &page2[..])], 0.3);
        assert!((data.average_confidence - 0.5).abs() < 1e-9);
        assert_eq!(data.min_confidence, 0.1);
        assert_eq!(data.max_confidence, 0.9);
        assert_eq!(
            data.text_blocks.iter().map(|b| b.page).collect::<Vec<_>>(),
            vec![1, 1, 2]
        );
    }

    #[test]
    fn no_detections_means_zero_statistics() {
        let data = aggregate([(1, &[][..]), (2, &[][..])], 0.3);
        assert_eq!(data.average_confidence, 0.0);
        assert_eq!(data.min_confidence, 0.0);
        assert_eq!(data.max_confidence, 0.0);
        assert_eq!(data.total_text_blocks, 0);
    }
}
