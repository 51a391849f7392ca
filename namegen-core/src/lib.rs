pub mod char_rnn;
pub mod error;
pub mod generator;
pub mod model;
pub mod run;
pub mod vocab;
