use candle_core::Tensor;

use crate::error::{NameGenError, Result};

/// Conditioning tag consumed by the model's hidden-state initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            other => Err(NameGenError::UnknownSymbol(other.to_string())),
        }
    }

    /// The fixed binary encoding the initializer consumes; the full tag
    /// string never reaches the model.
    pub fn as_bit(self) -> u32 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
        }
    }
}

/// Inference contract of a pretrained recurrent conditional model.
///
/// Implementations must be pure against their weights: `forward` holds no
/// mutable decoding state, so a single model instance can serve concurrent
/// generation calls, each owning its own hidden state.
pub trait ConditionalModel {
    /// Builds the initial hidden state from the gender bit alone. Country
    /// and seed only enter through forward steps.
    fn init_hidden(&self, gender_bit: u32) -> candle_core::Result<Tensor>;

    /// One recurrence step: (country index, input character index, hidden
    /// state) to (logits over the full vocabulary including sentinels,
    /// updated hidden state). Logits are a rank-1 tensor.
    fn forward(
        &self,
        country: u32,
        input: u32,
        hidden: &Tensor,
    ) -> candle_core::Result<(Tensor, Tensor)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!(Gender::parse("M").unwrap(), Gender::Male);
        assert_eq!(Gender::parse("F").unwrap(), Gender::Female);
    }

    #[test]
    fn test_parse_rejects_unknown_tags() {
        for tag in ["", "m", "f", "X", "MF"] {
            assert!(matches!(
                Gender::parse(tag),
                Err(NameGenError::UnknownSymbol(_))
            ));
        }
    }

    #[test]
    fn test_bit_encoding_is_fixed() {
        assert_eq!(Gender::Male.as_bit(), 0);
        assert_eq!(Gender::Female.as_bit(), 1);
    }
}
