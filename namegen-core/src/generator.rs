use rand::{
    distr::{Distribution, weighted::WeightedIndex},
    rngs::StdRng,
};

use crate::{
    error::{NameGenError, Result},
    model::{ConditionalModel, Gender},
    vocab::{CountryTable, END_INDEX, START_INDEX, Vocabulary},
};

/// Candidates kept per decoding step before renormalizing. Fixed; if the
/// vocabulary is smaller, all of it is kept.
const TOP_K: usize = 5;

/// One generation request, immutable for the duration of the call.
/// `max_len` bounds the total output length, seed included.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub country_code: String,
    pub gender: String,
    pub seed: String,
    pub max_len: usize,
}

/// Drives the decoding loop against a pretrained model: replays the seed
/// to synchronize the hidden state, then samples one character per forward
/// step until the end marker is drawn or the length bound is hit.
///
/// The only mutable state is the hidden state and output buffer owned by
/// each call, so one generator can serve concurrent calls as long as the
/// model's forward pass is pure.
pub struct NameGenerator<'a> {
    model: &'a dyn ConditionalModel,
    vocab: &'a Vocabulary,
    countries: &'a CountryTable,
}

impl<'a> NameGenerator<'a> {
    pub fn new(
        model: &'a dyn ConditionalModel,
        vocab: &'a Vocabulary,
        countries: &'a CountryTable,
    ) -> Self {
        Self {
            model,
            vocab,
            countries,
        }
    }

    pub fn generate(&self, request: &GenerationRequest, rng: &mut StdRng) -> Result<String> {
        let seed_len = request.seed.chars().count();
        if request.max_len < seed_len {
            return Err(NameGenError::InvalidLength {
                max_len: request.max_len,
                seed_len,
            });
        }
        let country = self.countries.encode(&request.country_code)?;
        let gender = Gender::parse(&request.gender)?;

        // The initial hidden state is a function of the gender bit alone;
        // country and seed only enter through forward steps.
        let mut hidden = self.model.init_hidden(gender.as_bit())?;

        // Warm-up phase: replay every encoded symbol except the last,
        // keeping only the hidden-state updates. This leaves the state as
        // if the seed had been generated one character at a time.
        let encoded = self.vocab.encode_with_start(&request.seed)?;
        for &token in &encoded[..encoded.len() - 1] {
            let (_, next_hidden) = self.model.forward(country, token, &hidden)?;
            hidden = next_hidden;
        }
        // encode_with_start always yields at least the start marker.
        let mut input = encoded[encoded.len() - 1];

        // Decoding phase.
        let mut result = request.seed.clone();
        for _ in 0..(request.max_len - seed_len) {
            let (logits, next_hidden) = self.model.forward(country, input, &hidden)?;
            hidden = next_hidden;

            let mut logits: Vec<f32> = logits.to_vec1()?;
            if logits.len() != self.vocab.len() {
                return Err(NameGenError::ModelContractViolation {
                    expected: self.vocab.len(),
                    actual: logits.len(),
                });
            }
            // The start marker is a sentinel, not a generatable character;
            // keep it out of the draw.
            logits[START_INDEX as usize] = f32::NEG_INFINITY;

            let token = sample_top_k(&logits, TOP_K, rng)?;
            if token == END_INDEX {
                break;
            }
            result.push(self.vocab.decode_char(token)?);
            input = token;
        }

        Ok(result)
    }
}

/// The (at most) `k` highest-logit candidates with their probabilities,
/// renormalized over the truncated set only. This is not a full-vocabulary
/// softmax: the tail is cut before normalizing, which biases decoding away
/// from low-probability symbols while staying stochastic.
pub(crate) fn top_k_candidates(logits: &[f32], k: usize) -> Vec<(u32, f32)> {
    let mut candidates: Vec<(u32, f32)> = logits
        .iter()
        .enumerate()
        .map(|(i, &logit)| (i as u32, logit))
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.truncate(k);

    // Shifting by the max logit before exponentiating cancels out in the
    // renormalization but keeps exp() in range for large logits.
    let max_logit = candidates[0].1;
    let mut total = 0.0;
    for (_, value) in candidates.iter_mut() {
        *value = (*value - max_logit).exp();
        total += *value;
    }
    for (_, value) in candidates.iter_mut() {
        *value /= total;
    }
    candidates
}

fn sample_top_k(logits: &[f32], k: usize, rng: &mut StdRng) -> Result<u32> {
    let candidates = top_k_candidates(logits, k);
    let weights: Vec<f32> = candidates.iter().map(|&(_, prob)| prob).collect();
    let dist = WeightedIndex::new(&weights)?;
    Ok(candidates[dist.sample(rng)].0)
}
