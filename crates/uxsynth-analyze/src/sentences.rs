//! Punctuation-driven sentence and paragraph splitting.
//!
//! A sentence is a run of non-terminator characters followed by one or
//! more of `.`, `!`, `?`. Abbreviations and decimals are not special-cased,
//! so "Dr. Smith" yields two fragments. Text after the last terminator is
//! not a sentence.

const TERMINATORS: &[u8] = b".!?";

fn is_terminator(b: u8) -> bool {
    TERMINATORS.contains(&b)
}

/// Lazy sentence iterator over borrowed text. Cloning restarts from the
/// clone point, so the sequence can be walked more than once.
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.text.as_bytes();
        loop {
            // A match must start on a non-terminator.
            while self.pos < bytes.len() && is_terminator(bytes[self.pos]) {
                self.pos += 1;
            }
            let start = self.pos;
            while self.pos < bytes.len() && !is_terminator(bytes[self.pos]) {
                self.pos += 1;
            }
            if self.pos >= bytes.len() {
                return None;
            }
            while self.pos < bytes.len() && is_terminator(bytes[self.pos]) {
                self.pos += 1;
            }
            // Terminators are ASCII, so these offsets are char boundaries.
            let sentence = self.text[start..self.pos].trim();
            if !sentence.is_empty() {
                return Some(sentence);
            }
        }
    }
}

/// Split text into trimmed sentences in source order.
pub fn split_sentences(text: &str) -> Sentences<'_> {
    Sentences { text, pos: 0 }
}

/// Split text into paragraphs on blank lines.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start: Option<usize> = None;
    let mut offset = 0;
    let mut last_end = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                paragraphs.push(text[s..last_end].trim());
            }
        } else {
            if start.is_none() {
                start = Some(offset);
            }
            last_end = offset + line.len();
        }
        offset += line.len();
    }
    if let Some(s) = start {
        paragraphs.push(text[s..last_end].trim());
    }
    paragraphs
}

/// A `.`-bounded slice of text with its byte span in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub text: &'a str,
    pub start: usize,
}

/// Split on `.` only, trimming each piece. Fragments keep their offset so
/// callers can prove the text came from the source verbatim.
pub fn period_fragments(text: &str) -> Vec<Fragment<'_>> {
    let mut fragments = Vec::new();
    let mut offset = 0;
    for piece in text.split('.') {
        let leading = piece.len() - piece.trim_start().len();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            fragments.push(Fragment {
                text: trimmed,
                start: offset + leading,
            });
        }
        offset += piece.len() + 1;
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let sentences: Vec<&str> =
            split_sentences("I think so. Really?! Maybe not... trailing words").collect();
        assert_eq!(sentences, vec!["I think so.", "Really?!", "Maybe not..."]);
    }

    #[test]
    fn test_abbreviations_split() {
        let sentences: Vec<&str> = split_sentences("Dr. Smith said hi.").collect();
        assert_eq!(sentences, vec!["Dr.", "Smith said hi."]);
    }

    #[test]
    fn test_restartable() {
        let sentences = split_sentences("One. Two. Three.");
        assert_eq!(sentences.clone().count(), 3);
        assert_eq!(sentences.clone().nth(1), Some("Two."));
        assert_eq!(sentences.count(), 3);
    }

    #[test]
    fn test_empty_and_terminator_only() {
        assert_eq!(split_sentences("").count(), 0);
        assert_eq!(split_sentences("...!?").count(), 0);
        assert_eq!(split_sentences("no terminator here").count(), 0);
    }

    #[test]
    fn test_multibyte_text() {
        let sentences: Vec<&str> = split_sentences("Café was nice. Ça va?").collect();
        assert_eq!(sentences, vec!["Café was nice.", "Ça va?"]);
    }

    #[test]
    fn test_paragraphs() {
        let text = "First line\nstill first\n\n  \nSecond para\n\nThird";
        assert_eq!(
            split_paragraphs(text),
            vec!["First line\nstill first", "Second para", "Third"]
        );
    }

    #[test]
    fn test_period_fragments_offsets() {
        let text = "It is slow.  The export is broken. ";
        let fragments = period_fragments(text);
        assert_eq!(fragments.len(), 2);
        for f in &fragments {
            assert_eq!(&text[f.start..f.start + f.text.len()], f.text);
        }
        assert_eq!(fragments[1].text, "The export is broken");
    }
}
