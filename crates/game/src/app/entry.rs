use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum EntryError {
    #[error("nothing has been typed")]
    Empty,
    #[error("'{0}' is not a digit")]
    NotDigit(char),
    #[error("entries are limited to {max} digits")]
    TooLong { max: usize },
}

/// Text box that accepts whole non-negative numbers only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NumericEntry {
    text: String,
    max_digits: usize,
}

impl NumericEntry {
    pub(crate) fn new(max_digits: usize) -> Self {
        Self {
            text: String::new(),
            max_digits: max_digits.max(1),
        }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn push_char(&mut self, ch: char) -> Result<(), EntryError> {
        if !ch.is_ascii_digit() {
            return Err(EntryError::NotDigit(ch));
        }
        if self.text.len() >= self.max_digits {
            return Err(EntryError::TooLong {
                max: self.max_digits,
            });
        }
        self.text.push(ch);
        Ok(())
    }

    pub(crate) fn backspace(&mut self) {
        self.text.pop();
    }

    pub(crate) fn clear(&mut self) {
        self.text.clear();
    }

    /// Parses and clears the entry. A rejected submission leaves the text
    /// in place.
    pub(crate) fn submit(&mut self) -> Result<u32, EntryError> {
        if self.text.is_empty() {
            return Err(EntryError::Empty);
        }
        // Only digits are ever pushed and max_digits bounds the length.
        let value = self
            .text
            .parse::<u32>()
            .map_err(|_| EntryError::TooLong {
                max: self.max_digits,
            })?;
        self.text.clear();
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_build_a_number() {
        let mut entry = NumericEntry::new(2);
        entry.push_char('4').expect("digit");
        entry.push_char('2').expect("digit");
        assert_eq!(entry.submit(), Ok(42));
        assert_eq!(entry.text(), "");
    }

    #[test]
    fn malformed_keystrokes_are_rejected_without_changing_text() {
        let mut entry = NumericEntry::new(2);
        entry.push_char('7').expect("digit");
        assert_eq!(entry.push_char('x'), Err(EntryError::NotDigit('x')));
        assert_eq!(entry.push_char('.'), Err(EntryError::NotDigit('.')));
        entry.push_char('0').expect("digit");
        assert_eq!(entry.push_char('1'), Err(EntryError::TooLong { max: 2 }));
        assert_eq!(entry.text(), "70");
    }

    #[test]
    fn empty_submission_is_rejected() {
        let mut entry = NumericEntry::new(2);
        assert_eq!(entry.submit(), Err(EntryError::Empty));

        entry.push_char('5').expect("digit");
        entry.backspace();
        assert_eq!(entry.submit(), Err(EntryError::Empty));
    }
}
