use clap::Parser;

use crate::device::Device;

#[derive(Parser)]
pub struct Args {
    /// The run metadata file, in MessagePack format.
    #[arg(long, default_value_t = String::from("run.mp"))]
    pub meta: String,

    /// The pretrained weights file, in safetensors format.
    #[arg(long, default_value_t = String::from("run.safetensors"))]
    pub weights: String,

    /// Two-letter country code to condition on.
    #[arg(long)]
    pub country: String,

    /// Gender tag to condition on (M or F).
    #[arg(long)]
    pub gender: String,

    /// Characters every generated name must start with.
    #[arg(long, default_value_t = String::new())]
    pub start_with: String,

    /// Maximum name length, including the starting characters.
    #[arg(long, default_value_t = 20)]
    pub max_len: usize,

    /// Number of names to generate.
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Random number seed.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Device::Cpu)]
    pub device: Device,
}
