use std::collections::HashMap;

/// A non-owning reference to a token in the engine's shared [`Vocab`].
///
/// Candidates carry `TokenId`s instead of owned strings; the backing store
/// lives in [`crate::engine::EngineState`] for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u32);

impl TokenId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interning token store shared by the phrase table, the language model and
/// every translation produced by the engine.
///
/// Fully populated while the models load; read-only afterwards. A source
/// token with no id is unknown to every model table.
#[derive(Debug, Default)]
pub struct Vocab {
    tokens: Vec<String>,
    index: HashMap<String, u32>,
}

impl Vocab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a token, returning the existing id if already present.
    pub fn intern(&mut self, token: &str) -> TokenId {
        if let Some(&id) = self.index.get(token) {
            return TokenId(id);
        }
        let id = self.tokens.len() as u32;
        self.tokens.push(token.to_string());
        self.index.insert(token.to_string(), id);
        TokenId(id)
    }

    /// Look up a token without interning.
    pub fn get(&self, token: &str) -> Option<TokenId> {
        self.index.get(token).map(|&id| TokenId(id))
    }

    /// Resolve an id back to its surface form.
    pub fn token(&self, id: TokenId) -> &str {
        &self.tokens[id.index()]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
