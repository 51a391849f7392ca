use std::collections::HashMap;

use crate::error::{NameGenError, Result};

/// Index of the start-of-sequence marker.
pub const START_INDEX: u32 = 0;

/// Index of the end-of-sequence marker. Drawing it stops generation.
pub const END_INDEX: u32 = 1;

/// Reserved sentinel indices at the head of the vocabulary.
const SENTINELS: u32 = 2;

/// Character-level vocabulary with two reserved sentinels: index 0 marks
/// the start of a sequence, index 1 the end. Real characters occupy the
/// dense range starting at index 2, in sorted order, so the forward and
/// inverse mappings are bijective.
#[derive(Clone)]
pub struct Vocabulary {
    ctoi: HashMap<char, u32>,
    itoc: HashMap<u32, char>,
}

impl Vocabulary {
    pub fn from_char_vec(mut vec: Vec<char>) -> Self {
        vec.sort();
        vec.dedup();
        let mut ctoi: HashMap<char, u32> = HashMap::new();
        let mut itoc = HashMap::new();
        for (i, char) in vec.iter().enumerate() {
            ctoi.insert(*char, i as u32 + SENTINELS);
            itoc.insert(i as u32 + SENTINELS, *char);
        }
        Vocabulary { ctoi, itoc }
    }

    pub fn into_char_vec(self) -> Vec<char> {
        let mut chars: Vec<char> = self.ctoi.into_keys().collect();
        chars.sort();
        chars
    }

    /// Total vocabulary size, sentinels included. The model's logits must
    /// have exactly this many entries.
    pub fn len(&self) -> usize {
        self.ctoi.len() + SENTINELS as usize
    }

    pub fn encode_char(&self, char: char) -> Result<u32> {
        let Some(&token) = self.ctoi.get(&char) else {
            return Err(NameGenError::UnknownSymbol(char.to_string()));
        };
        Ok(token)
    }

    /// Integer-encodes a run of already-known characters with the start
    /// marker prepended. The marker is prepended even for an empty seed,
    /// so the first hidden state is always derived from the same input.
    pub fn encode_with_start(&self, seed: &str) -> Result<Vec<u32>> {
        let mut result = Vec::with_capacity(seed.len() + 1);
        result.push(START_INDEX);
        for char in seed.chars() {
            result.push(self.encode_char(char)?);
        }
        Ok(result)
    }

    /// Inverse lookup for generated tokens. The sentinels are not
    /// characters, so they fail here rather than leak into output.
    pub fn decode_char(&self, token: u32) -> Result<char> {
        let Some(&char) = self.itoc.get(&token) else {
            return Err(NameGenError::UnknownSymbol(token.to_string()));
        };
        Ok(char)
    }
}

/// Two-letter country codes mapped to dense, zero-based indices. Pure
/// conditioning signal: read-only after construction.
#[derive(Clone)]
pub struct CountryTable {
    atoi: HashMap<String, u32>,
}

impl CountryTable {
    pub fn from_codes(mut codes: Vec<String>) -> Self {
        codes.sort();
        codes.dedup();
        let mut atoi = HashMap::new();
        for (i, code) in codes.into_iter().enumerate() {
            atoi.insert(code, i as u32);
        }
        CountryTable { atoi }
    }

    pub fn len(&self) -> usize {
        self.atoi.len()
    }

    pub fn encode(&self, code: &str) -> Result<u32> {
        let Some(&index) = self.atoi.get(code) else {
            return Err(NameGenError::UnknownSymbol(code.to_string()));
        };
        Ok(index)
    }

    pub fn into_codes(self) -> Vec<String> {
        let mut codes: Vec<String> = self.atoi.into_keys().collect();
        codes.sort();
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_characters_start_after_sentinels() {
        let vocab = Vocabulary::from_char_vec(vec!['b', 'a']);

        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.encode_char('a').unwrap(), 2);
        assert_eq!(vocab.encode_char('b').unwrap(), 3);
    }

    #[test]
    fn test_duplicate_characters_collapse() {
        let vocab = Vocabulary::from_char_vec(vec!['a', 'b', 'a', 'b']);

        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.into_char_vec(), vec!['a', 'b']);
    }

    #[test]
    fn test_encode_with_start_always_prepends_marker() {
        let vocab = Vocabulary::from_char_vec(vec!['a', 'b']);

        assert_eq!(vocab.encode_with_start("").unwrap(), vec![START_INDEX]);
        assert_eq!(vocab.encode_with_start("ab").unwrap(), vec![START_INDEX, 2, 3]);
    }

    #[test]
    fn test_encode_unknown_character_fails() {
        let vocab = Vocabulary::from_char_vec(vec!['a', 'b']);

        assert!(matches!(
            vocab.encode_with_start("az"),
            Err(NameGenError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_decode_is_inverse_of_encode() {
        let vocab = Vocabulary::from_char_vec(vec!['x', 'y', 'z']);

        for char in ['x', 'y', 'z'] {
            let token = vocab.encode_char(char).unwrap();
            assert_eq!(vocab.decode_char(token).unwrap(), char);
        }
    }

    #[test]
    fn test_decode_rejects_sentinels_and_out_of_range() {
        let vocab = Vocabulary::from_char_vec(vec!['a']);

        assert!(vocab.decode_char(START_INDEX).is_err());
        assert!(vocab.decode_char(END_INDEX).is_err());
        assert!(vocab.decode_char(99).is_err());
    }

    #[test]
    fn test_country_table_lookup() {
        let countries =
            CountryTable::from_codes(vec!["DK".to_owned(), "DE".to_owned(), "DK".to_owned()]);

        assert_eq!(countries.len(), 2);
        assert_eq!(countries.encode("DE").unwrap(), 0);
        assert_eq!(countries.encode("DK").unwrap(), 1);
        assert!(matches!(
            countries.encode("XX"),
            Err(NameGenError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_country_table_into_codes() {
        let countries = CountryTable::from_codes(vec!["US".to_owned(), "DE".to_owned()]);
        assert_eq!(countries.into_codes(), vec!["DE".to_owned(), "US".to_owned()]);
    }
}
