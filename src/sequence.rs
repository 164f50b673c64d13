use rand::seq::SliceRandom;

/// One element of the practice alphabet, matched against a single key-press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(char);

impl Symbol {
    pub fn new(glyph: char) -> Self {
        Self(glyph)
    }

    pub fn glyph(&self) -> char {
        self.0
    }

    /// Exact value comparison against one keyboard character.
    pub fn matches(&self, key: char) -> bool {
        self.0 == key
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed set of symbols a session draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<Symbol>,
}

impl Alphabet {
    /// Build an alphabet from the characters of `keys`, deduplicated in
    /// first-seen order. Empty input falls back to the default home row.
    pub fn from_keys(keys: &str) -> Self {
        let mut symbols: Vec<Symbol> = Vec::new();
        for c in keys.chars() {
            if !symbols.iter().any(|s| s.glyph() == c) {
                symbols.push(Symbol::new(c));
            }
        }
        if symbols.is_empty() {
            return Self::default();
        }
        Self { symbols }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, key: char) -> bool {
        self.symbols.iter().any(|s| s.matches(key))
    }

    /// Sample a sequence of `len` symbols by independent uniform draws
    /// *with replacement*; adjacent duplicates are expected.
    pub fn sample(&self, len: usize) -> Vec<Symbol> {
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| *self.symbols.choose(&mut rng).unwrap_or(&Symbol::new('?')))
            .collect()
    }

    /// Characters of the alphabet, for display and config round-trips.
    pub fn as_string(&self) -> String {
        self.symbols.iter().map(|s| s.glyph()).collect()
    }
}

impl Default for Alphabet {
    /// Home row: the classic first lesson of touch typing.
    fn default() -> Self {
        Self::from_keys("asdfjkl;")
    }
}
