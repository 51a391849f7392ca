use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{Embedding, Linear, Module, VarBuilder};

use crate::model::ConditionalModel;

/// Recurrent conditional model over characters: a country embedding and a
/// character embedding are concatenated with the carried hidden state and
/// pushed through a tanh recurrence; a linear head projects the hidden
/// state to logits over the vocabulary. The initial hidden state is an
/// embedding lookup on the gender bit.
pub struct CharRnn {
    country_embedding: Embedding,
    char_embedding: Embedding,
    gender_embedding: Embedding,
    i2h: Linear,
    h2o: Linear,
    device: Device,
}

#[derive(Copy, Clone)]
pub struct CharRnnOptions {
    pub num_countries: usize,
    /// Vocabulary size including the start/end sentinels.
    pub vocab_size: usize,
    pub embedding_dims: usize,
    pub hidden_dims: usize,
}

impl CharRnn {
    pub fn new(options: CharRnnOptions, vb: VarBuilder) -> Result<Self> {
        let CharRnnOptions {
            num_countries,
            vocab_size,
            embedding_dims,
            hidden_dims,
        } = options;

        let device = vb.device().clone();
        let country_embedding =
            candle_nn::embedding(num_countries, embedding_dims, vb.pp("country_embedding"))?;
        let char_embedding =
            candle_nn::embedding(vocab_size, embedding_dims, vb.pp("char_embedding"))?;
        let gender_embedding = candle_nn::embedding(2, hidden_dims, vb.pp("gender_embedding"))?;
        let i2h = candle_nn::linear(2 * embedding_dims + hidden_dims, hidden_dims, vb.pp("i2h"))?;
        let h2o = candle_nn::linear(hidden_dims, vocab_size, vb.pp("h2o"))?;
        Ok(Self {
            country_embedding,
            char_embedding,
            gender_embedding,
            i2h,
            h2o,
            device,
        })
    }

    fn embed(&self, table: &Embedding, index: u32) -> candle_core::Result<Tensor> {
        let index = Tensor::from_slice(&[index], (1,), &self.device)?;
        table.forward(&index)
    }
}

impl ConditionalModel for CharRnn {
    fn init_hidden(&self, gender_bit: u32) -> candle_core::Result<Tensor> {
        self.embed(&self.gender_embedding, gender_bit)
    }

    fn forward(
        &self,
        country: u32,
        input: u32,
        hidden: &Tensor,
    ) -> candle_core::Result<(Tensor, Tensor)> {
        let country = self.embed(&self.country_embedding, country)?;
        let input = self.embed(&self.char_embedding, input)?;
        let combined = Tensor::cat(&[&country, &input, hidden], 1)?;
        let hidden = self.i2h.forward(&combined)?.tanh()?;
        let logits = self.h2o.forward(&hidden)?.squeeze(0)?;
        Ok((logits, hidden))
    }
}

#[cfg(test)]
mod tests {
    use candle_core::DType;
    use candle_nn::VarMap;

    use super::*;

    const OPTIONS: CharRnnOptions = CharRnnOptions {
        num_countries: 3,
        vocab_size: 30,
        embedding_dims: 8,
        hidden_dims: 16,
    };

    fn test_model() -> CharRnn {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        CharRnn::new(OPTIONS, vb).unwrap()
    }

    #[test]
    fn test_init_hidden_shape() {
        let model = test_model();
        let hidden = model.init_hidden(1).unwrap();
        assert_eq!(hidden.dims2().unwrap(), (1, OPTIONS.hidden_dims));
    }

    #[test]
    fn test_forward_shapes() {
        let model = test_model();
        let hidden = model.init_hidden(0).unwrap();
        let (logits, hidden) = model.forward(2, 5, &hidden).unwrap();

        assert_eq!(logits.dims1().unwrap(), OPTIONS.vocab_size);
        assert_eq!(hidden.dims2().unwrap(), (1, OPTIONS.hidden_dims));
    }

    #[test]
    fn test_forward_is_pure() {
        let model = test_model();
        let hidden = model.init_hidden(0).unwrap();
        let (first, _) = model.forward(0, 3, &hidden).unwrap();
        let (second, _) = model.forward(0, 3, &hidden).unwrap();

        assert_eq!(
            first.to_vec1::<f32>().unwrap(),
            second.to_vec1::<f32>().unwrap()
        );
    }

    #[test]
    fn test_genders_initialize_distinct_states() {
        let model = test_model();
        let male = model.init_hidden(0).unwrap().to_vec2::<f32>().unwrap();
        let female = model.init_hidden(1).unwrap().to_vec2::<f32>().unwrap();
        assert_ne!(male, female);
    }
}
