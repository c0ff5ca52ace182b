use crate::domain::model::CandidateSequence;
use crate::domain::ports::SequenceGenerator;

pub const DEFAULT_EOS_MARKER: &str = "<|endoftext|>";
pub const CANONICAL_RESIDUES: &str = "ACDEFGHIKLMNPQRSTVWY";

/// Reduces raw model output to canonical amino-acid letters.
///
/// Removes `eos_marker`, drops whitespace, upper-cases, keeps only the 20
/// canonical residues, then truncates to `max_length`. Idempotent.
pub fn clean_sequence(raw: &str, eos_marker: &str, max_length: usize) -> String {
    let without_marker = if eos_marker.is_empty() {
        raw.to_string()
    } else {
        raw.replace(eos_marker, "")
    };

    without_marker
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| CANONICAL_RESIDUES.contains(*c))
        .take(max_length)
        .collect()
}

/// Wraps a generative backend: sizes the request from the reference, degrades
/// backend failures to an empty set and cleans every completion.
pub struct CandidateGenerator {
    backend: Box<dyn SequenceGenerator>,
    seed: String,
    eos_marker: String,
}

impl CandidateGenerator {
    pub fn new(backend: Box<dyn SequenceGenerator>) -> Self {
        Self {
            backend,
            seed: DEFAULT_EOS_MARKER.to_string(),
            eos_marker: DEFAULT_EOS_MARKER.to_string(),
        }
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    pub fn with_eos_marker(mut self, eos_marker: impl Into<String>) -> Self {
        self.eos_marker = eos_marker.into();
        self
    }

    pub async fn generate(
        &self,
        reference: &str,
        max_length: Option<usize>,
        count: usize,
    ) -> Vec<CandidateSequence> {
        let max_length = max_length.unwrap_or_else(|| reference.chars().count());
        if count == 0 || max_length == 0 {
            return Vec::new();
        }

        let mut outputs = match self.backend.generate(&self.seed, max_length, count).await {
            Ok(outputs) => outputs,
            Err(e) => {
                tracing::warn!("⚠️ GenerationFailure: {}", e);
                return Vec::new();
            }
        };

        if outputs.len() > count {
            tracing::debug!("Backend returned {} outputs, keeping {}", outputs.len(), count);
            outputs.truncate(count);
        } else if outputs.len() < count {
            tracing::warn!("⚠️ Backend returned {} of {} requested candidates", outputs.len(), count);
        }

        outputs
            .into_iter()
            .enumerate()
            .map(|(i, raw_text)| CandidateSequence {
                index: i + 1,
                cleaned_sequence: clean_sequence(&raw_text, &self.eos_marker, max_length),
                raw_text,
            })
            .collect()
    }
}
