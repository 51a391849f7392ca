use std::{fs, path::Path};

use anyhow::{Result, anyhow};
use candle_core::{
    DType, Device, Tensor,
    safetensors::{BufferedSafetensors, MmapedSafetensors, SliceSafetensors},
};
use candle_nn::{VarBuilder, VarMap};
use serde::{Deserialize, Serialize};

use crate::{
    char_rnn::{CharRnn, CharRnnOptions},
    vocab::{CountryTable, Vocabulary},
};

/// Everything the training side persists about a run besides the weights:
/// the tables the model was trained against and its dimensions. Stored as
/// MessagePack next to the safetensors weights file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub countries: Vec<String>,
    pub alphabet: Vec<char>,
    pub embedding_dims: usize,
    pub hidden_dims: usize,
}

impl RunMetadata {
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec(self)?)
    }
}

/// A pretrained run ready for inference: loaded once at process start and
/// shared read-only across generation calls.
pub struct PretrainedRun {
    pub model: CharRnn,
    pub vocab: Vocabulary,
    pub countries: CountryTable,
}

/// Ideally this would be a trait supported by all the
/// safetensors structs in candle.
pub trait SafetensorsLoader {
    fn load_tensor(&self, name: &str, dev: &Device) -> candle_core::Result<Tensor>;
}

impl SafetensorsLoader for MmapedSafetensors {
    fn load_tensor(&self, name: &str, dev: &Device) -> candle_core::Result<Tensor> {
        self.load(name, dev)
    }
}

impl<'a> SafetensorsLoader for SliceSafetensors<'a> {
    fn load_tensor(&self, name: &str, dev: &Device) -> candle_core::Result<Tensor> {
        self.load(name, dev)
    }
}

impl SafetensorsLoader for BufferedSafetensors {
    fn load_tensor(&self, name: &str, dev: &Device) -> candle_core::Result<Tensor> {
        self.load(name, dev)
    }
}

pub fn load_data_from_safetensors<T: SafetensorsLoader>(
    varmap: &mut VarMap,
    safetensors: &T,
) -> Result<()> {
    // This is mostly what VarMap::load() does, but that method is specific
    // to loading data from a file, while this isn't.
    let mut tensor_data = varmap.data().lock().unwrap();
    for (name, var) in tensor_data.iter_mut() {
        let data = safetensors.load_tensor(name, var.device())?;
        if let Err(err) = var.set(&data) {
            return Err(anyhow!("error setting {name} using safetensor data: {err}",));
        }
    }
    Ok(())
}

/// Loads a pretrained run from its metadata and weights files.
pub fn load_run(
    meta_path: impl AsRef<Path>,
    weights_path: impl AsRef<Path>,
    device: &Device,
) -> Result<PretrainedRun> {
    let meta = RunMetadata::from_msgpack(&fs::read(meta_path)?)?;
    // Same unsafety as VarMap::load(); the weights file is mmapped.
    let safetensors = unsafe { MmapedSafetensors::new(weights_path)? };
    build_run(&meta, &safetensors, device)
}

/// Like `load_run`, but for callers that already hold both files in
/// memory.
pub fn load_run_from_slices(
    meta: &[u8],
    weights: &[u8],
    device: &Device,
) -> Result<PretrainedRun> {
    let meta = RunMetadata::from_msgpack(meta)?;
    let safetensors = SliceSafetensors::new(weights)?;
    build_run(&meta, &safetensors, device)
}

fn build_run<T: SafetensorsLoader>(
    meta: &RunMetadata,
    safetensors: &T,
    device: &Device,
) -> Result<PretrainedRun> {
    let vocab = Vocabulary::from_char_vec(meta.alphabet.clone());
    let countries = CountryTable::from_codes(meta.countries.clone());
    let options = CharRnnOptions {
        num_countries: countries.len(),
        vocab_size: vocab.len(),
        embedding_dims: meta.embedding_dims,
        hidden_dims: meta.hidden_dims,
    };

    let mut varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
    let model = CharRnn::new(options, vb)?;
    load_data_from_safetensors(&mut varmap, safetensors)?;

    Ok(PretrainedRun {
        model,
        vocab,
        countries,
    })
}
