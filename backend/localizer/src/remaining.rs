//! Headline text not yet claimed by an accepted OCR fragment.

/// Ordered bag of headline tokens. Accepted fragments remove their tokens so a
/// headline word is not matched by more than one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemainingHeadline {
    tokens: Vec<String>,
}

impl RemainingHeadline {
    /// Seed from the extracted headline lines, joined in order.
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        let tokens = lines
            .iter()
            .flat_map(|line| line.as_ref().split_whitespace())
            .map(str::to_string)
            .collect();
        Self { tokens }
    }

    /// Remaining tokens joined with single spaces.
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Remove `fragment`'s tokens and return how many were removed.
    ///
    /// The first contiguous run equal to the fragment's tokens is removed if
    /// there is one. Otherwise each token is removed at its first occurrence.
    /// Tokens with no exact counterpart (OCR noise) remove nothing.
    pub fn consume(&mut self, fragment: &str) -> usize {
        let wanted: Vec<&str> = fragment.split_whitespace().collect();
        if wanted.is_empty() || self.tokens.is_empty() {
            return 0;
        }

        if let Some(start) = self
            .tokens
            .windows(wanted.len())
            .position(|window| window.iter().map(String::as_str).eq(wanted.iter().copied()))
        {
            self.tokens.drain(start..start + wanted.len());
            return wanted.len();
        }

        let mut removed = 0;
        for token in wanted {
            if let Some(idx) = self.tokens.iter().position(|t| t == token) {
                self.tokens.remove(idx);
                removed += 1;
            }
        }
        removed
    }
}
