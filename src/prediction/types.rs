use crate::utils::error::ClassifierError;
use crate::Result;
use serde::{Serialize, Serializer};

/// The three classes the network was trained on, in output-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Paper = 0,
    Rock = 1,
    Scissor = 2,
}

impl Gesture {
    pub const ALL: [Gesture; 3] = [Gesture::Paper, Gesture::Rock, Gesture::Scissor];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Gesture::Paper => "Paper",
            Gesture::Rock => "Rock",
            Gesture::Scissor => "Scissor",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Gesture::Paper => "✋🏼",
            Gesture::Rock => "✊🏼",
            Gesture::Scissor => "✌🏼",
        }
    }

    /// Headline text, e.g. `Rock ✊🏼`.
    pub fn label(self) -> String {
        format!("{} {}", self.name(), self.emoji())
    }
}

impl Serialize for Gesture {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Softmax output of the network: probabilities for (paper, rock, scissors).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PredictionVector([f32; 3]);

/// Softmax output may overshoot 1.0 by a rounding error.
const PROBABILITY_SLACK: f32 = 1e-4;

impl PredictionVector {
    pub fn new(values: [f32; 3]) -> Result<Self> {
        let in_range = |v: f32| v.is_finite() && (0.0..=1.0 + PROBABILITY_SLACK).contains(&v);
        if let Some(bad) = values.iter().find(|v| !in_range(**v)) {
            return Err(ClassifierError::Inference(format!(
                "probability out of range: {}",
                bad
            )));
        }
        Ok(Self(values))
    }

    /// Builds a vector from a raw model output of unknown length.
    pub fn from_slice(values: &[f32]) -> Result<Self> {
        let values: [f32; 3] = values.try_into().map_err(|_| {
            ClassifierError::Inference(format!(
                "expected 3 class probabilities, got {}",
                values.len()
            ))
        })?;
        Self::new(values)
    }

    pub fn values(&self) -> [f32; 3] {
        self.0
    }

    pub fn get(&self, gesture: Gesture) -> f32 {
        self.0[gesture.index()]
    }

    /// Index of the largest probability; the first one wins a tie.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, p) in self.0.iter().enumerate().skip(1) {
            if *p > self.0[best] {
                best = i;
            }
        }
        best
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }
}

/// One row of the probability table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbability {
    pub gesture: Gesture,
    pub probability: f32,
    /// `probability * 100`, rounded to two decimals
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: Gesture,
    pub probabilities: PredictionVector,
    pub table: Vec<ClassProbability>,
}

impl ClassificationResult {
    pub fn headline(&self) -> String {
        self.label.label()
    }

    pub fn confidence(&self) -> f32 {
        self.probabilities.get(self.label)
    }
}
