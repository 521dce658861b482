/// A set of single-character delimiters used to split ascii array data.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Delimiters<'a>(&'a str);

impl<'a> Delimiters<'a> {
    /// Space, comma, tab and newline.  Accepts everything the writers produce.
    pub const DATA: Delimiters<'static> = Delimiters(" ,\t\n");

    /// Space and newline only.
    pub const WHITESPACE: Delimiters<'static> = Delimiters(" \n");

    /// Use every character of `chars` as a delimiter.
    pub fn new(chars: &'a str) -> Self {
        Delimiters(chars)
    }

    /// Returns `true` if `c` separates tokens.
    pub fn contains(&self, c: char) -> bool {
        self.0.contains(c)
    }

    /// The delimiter characters.
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

impl Default for Delimiters<'static> {
    fn default() -> Self {
        Delimiters::DATA
    }
}

/// Lazy iterator over the non-empty tokens of a delimited text.
///
/// Runs of consecutive delimiters never produce empty tokens.
#[derive(Debug, Clone)]
pub struct Tokenizer<'s, 'd> {
    rest: &'s str,
    delimiters: Delimiters<'d>,
}

impl<'s, 'd> Tokenizer<'s, 'd> {
    /// Begin tokenizing `source`.
    pub fn new(source: &'s str, delimiters: Delimiters<'d>) -> Self {
        Tokenizer { rest: source, delimiters }
    }
}

impl<'s, 'd> Iterator for Tokenizer<'s, 'd> {
    type Item = &'s str;

    fn next(&mut self) -> Option<&'s str> {
        let delimiters = self.delimiters;
        let start = self.rest.trim_start_matches(|c: char| delimiters.contains(c));
        if start.is_empty() {
            self.rest = start;
            return None;
        }

        let end = start.find(|c: char| delimiters.contains(c)).unwrap_or(start.len());
        let (token, rest) = start.split_at(end);
        self.rest = rest;
        Some(token)
    }
}

impl std::iter::FusedIterator for Tokenizer<'_, '_> {}
