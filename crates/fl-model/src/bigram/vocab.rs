use std::collections::{BTreeMap, HashMap};

/// Token used for words that did not make it into the vocabulary.
pub const UNK_TOKEN: &str = "<unk>";
/// Sentence boundary token; also the context for the first word.
pub const EOS_TOKEN: &str = "</s>";

/// Whitespace-tokenized word vocabulary.
///
/// Ids 0 and 1 are always `<unk>` and `</s>`; the remaining words follow in
/// lexicographic order so that the same corpus always yields the same ids.
#[derive(Debug, Clone)]
pub struct Vocab {
    /// Token strings, indexed by token ID.
    tokens: Vec<String>,
    /// Reverse mapping from token string to token ID.
    token_to_id: HashMap<String, u32>,
}

impl Vocab {
    pub const UNK_ID: u32 = 0;
    pub const EOS_ID: u32 = 1;

    /// Count words across `sentences` and keep those seen at least
    /// `min_count` times.
    pub fn from_sentences<I, S>(sentences: I, min_count: usize) -> Vocab
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for sentence in sentences {
            for word in sentence.as_ref().split_whitespace() {
                *counts.entry(word.to_string()).or_insert(0) += 1;
            }
        }

        let mut tokens = vec![UNK_TOKEN.to_string(), EOS_TOKEN.to_string()];
        tokens.extend(
            counts
                .into_iter()
                .filter(|(word, n)| *n >= min_count && word != UNK_TOKEN && word != EOS_TOKEN)
                .map(|(word, _)| word),
        );

        let token_to_id = tokens
            .iter()
            .enumerate()
            .map(|(id, tok)| (tok.clone(), id as u32))
            .collect();

        Vocab {
            tokens,
            token_to_id,
        }
    }

    /// Number of tokens in the vocabulary, specials included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: the special tokens are present in every vocabulary.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of words learned from the corpus.
    pub fn word_count(&self) -> usize {
        self.tokens.len() - 2
    }

    /// Id for `word`, or `<unk>`'s id if it is unknown.
    pub fn id(&self, word: &str) -> u32 {
        self.token_to_id.get(word).copied().unwrap_or(Self::UNK_ID)
    }

    /// Token string for `id`.
    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Split a sentence into token ids.
    pub fn encode(&self, sentence: &str) -> Vec<u32> {
        sentence.split_whitespace().map(|w| self.id(w)).collect()
    }

    /// (context, target) pairs for a sentence: every word predicted from the
    /// one before it, starting from `</s>` and ending with `</s>`.
    pub fn pairs(&self, sentence: &str) -> Vec<(u32, u32)> {
        let ids = self.encode(sentence);
        let mut pairs = Vec::with_capacity(ids.len() + 1);
        let mut prev = Self::EOS_ID;
        for id in ids {
            pairs.push((prev, id));
            prev = id;
        }
        pairs.push((prev, Self::EOS_ID));
        pairs
    }
}
