use rand::Rng;

use crate::models::ScoredCandidate;

/// How many winners one recommendation returns (primary + alternates)
pub const SAMPLE_COUNT: usize = 3;

/// Softmax temperature; lower sharpens toward the top scorer, higher
/// flattens toward uniform
pub const TEMPERATURE: f64 = 0.08;

/// Converts scores to a probability distribution via a temperature-scaled
/// softmax, shifted by the maximum score for numerical stability.
fn softmax(scores: &[f64], temperature: f64) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores
        .iter()
        .map(|score| ((score - max) / temperature).exp())
        .collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Draws up to `count` candidates without replacement.
///
/// Each draw walks the remaining pool accumulating probability mass until
/// the cumulative sum meets the uniform draw; floating-point residue falls
/// back to the first remaining candidate. After each removal the remaining
/// probabilities are renormalized to sum to 1. Output order is draw order:
/// the first draw becomes the primary pick.
pub fn weighted_sample<R: Rng>(
    pool: Vec<ScoredCandidate>,
    count: usize,
    temperature: f64,
    rng: &mut R,
) -> Vec<ScoredCandidate> {
    if pool.is_empty() || count == 0 {
        return Vec::new();
    }

    let scores: Vec<f64> = pool.iter().map(|scored| scored.score).collect();
    let mut probabilities = softmax(&scores, temperature);
    let mut remaining = pool;
    let mut sampled = Vec::with_capacity(count.min(remaining.len()));

    while sampled.len() < count && !remaining.is_empty() {
        let draw: f64 = rng.gen();

        let mut selected = 0;
        let mut cumulative = 0.0;
        for (index, probability) in probabilities.iter().enumerate() {
            cumulative += probability;
            if draw <= cumulative {
                selected = index;
                break;
            }
        }

        sampled.push(remaining.remove(selected));
        probabilities.remove(selected);

        let total: f64 = probabilities.iter().sum();
        if total > 0.0 {
            for probability in probabilities.iter_mut() {
                *probability /= total;
            }
        }
    }

    sampled
}
