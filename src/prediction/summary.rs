use crate::prediction::types::{ClassProbability, ClassificationResult, Gesture, PredictionVector};

pub struct ResultSummarizer;

impl ResultSummarizer {
    /// Labels a probability vector and builds the per-class table.
    ///
    /// Rows always come in `Paper, Rock, Scissor` order regardless of which
    /// class won.
    pub fn summarize(probabilities: PredictionVector) -> ClassificationResult {
        // argmax() is always 0..3
        let label = Gesture::from_index(probabilities.argmax()).unwrap_or(Gesture::Paper);

        let table = Gesture::ALL
            .iter()
            .map(|&gesture| {
                let probability = probabilities.get(gesture);
                ClassProbability {
                    gesture,
                    probability,
                    percentage: Self::percentage(probability),
                }
            })
            .collect();

        ClassificationResult {
            label,
            probabilities,
            table,
        }
    }

    /// `round(p * 100, 2)`
    pub fn percentage(probability: f32) -> f64 {
        (f64::from(probability) * 100.0 * 100.0).round() / 100.0
    }
}
