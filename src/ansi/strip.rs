//! Scanning styled lines into control sequences and visible glyphs.

pub const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Control(&'a str),
    Glyph(&'a str),
}

pub struct Tokens<'a> {
    line: &'a str,
    pos: usize,
}

pub fn tokens(line: &str) -> Tokens<'_> {
    Tokens { line, pos: 0 }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = (usize, Token<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        if start >= self.line.len() {
            return None;
        }

        if let Some(len) = control_len(self.line.as_bytes(), start) {
            self.pos = start + len;
            return Some((start, Token::Control(&self.line[start..self.pos])));
        }

        let ch_len = self.line[start..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(1);
        self.pos = start + ch_len;
        Some((start, Token::Glyph(&self.line[start..self.pos])))
    }
}

/// Length in bytes of the control sequence starting at `i`, if one starts there.
///
/// CSI runs through the first ASCII letter, OSC through `ESC \` or BEL. Both
/// are cut at end of input when unterminated. A lone ESC is not a sequence.
pub fn control_len(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes.get(i) != Some(&ESC) {
        return None;
    }

    match bytes.get(i + 1) {
        Some(b'[') => {
            let mut j = i + 2;
            while j < bytes.len() && !bytes[j].is_ascii_alphabetic() {
                j += 1;
            }
            if j < bytes.len() {
                j += 1;
            }
            Some(j - i)
        }
        Some(b']') => {
            let mut j = i + 2;
            while j < bytes.len() {
                if bytes[j] == ESC && bytes.get(j + 1) == Some(&b'\\') {
                    j += 2;
                    return Some(j - i);
                }
                if bytes[j] == BEL {
                    return Some(j + 1 - i);
                }
                j += 1;
            }
            Some(j - i)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrippedLine {
    pub plain: String,
    /// `positions[i]` is the byte offset in the raw line of the i-th visible codepoint.
    pub positions: Vec<usize>,
}

impl StrippedLine {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn raw_end_of(&self, raw: &str, index: usize) -> usize {
        match self.positions.get(index) {
            Some(&start) => {
                start
                    + raw[start..]
                        .chars()
                        .next()
                        .map(char::len_utf8)
                        .unwrap_or(0)
            }
            None => raw.len(),
        }
    }

    pub fn raw_start_of(&self, raw: &str, index: usize) -> usize {
        self.positions.get(index).copied().unwrap_or(raw.len())
    }
}

pub fn strip_with_mapping(line: &str) -> StrippedLine {
    let mut stripped = StrippedLine {
        plain: String::with_capacity(line.len()),
        positions: Vec::with_capacity(line.len()),
    };
    for (offset, token) in tokens(line) {
        if let Token::Glyph(glyph) = token {
            stripped.plain.push_str(glyph);
            stripped.positions.push(offset);
        }
    }
    stripped
}

pub fn strip(line: &str) -> String {
    tokens(line)
        .filter_map(|(_, token)| match token {
            Token::Glyph(glyph) => Some(glyph),
            Token::Control(_) => None,
        })
        .collect()
}

pub fn visible_len(line: &str) -> usize {
    tokens(line)
        .filter(|(_, token)| matches!(token, Token::Glyph(_)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_sgr_and_maps_offsets() {
        let line = "\x1b[34mab\x1b[0mc";
        let stripped = strip_with_mapping(line);
        assert_eq!(stripped.plain, "abc");
        assert_eq!(stripped.positions, vec![5, 6, 11]);
    }

    #[test]
    fn strips_osc_hyperlinks_with_both_terminators() {
        let st = "\x1b]8;;https://a.b\x1b\\link\x1b]8;;\x1b\\";
        assert_eq!(strip(st), "link");

        let bel = "\x1b]8;;https://a.b\x07link\x1b]8;;\x07";
        assert_eq!(strip(bel), "link");
    }

    #[test]
    fn truncated_sequences_run_to_end_of_line() {
        assert_eq!(strip("ab\x1b[38;5;"), "ab");
        assert_eq!(strip("ab\x1b]8;;https://never-closed"), "ab");
    }

    #[test]
    fn lone_escape_is_visible() {
        let stripped = strip_with_mapping("a\x1bb");
        assert_eq!(stripped.plain, "a\x1bb");
        assert_eq!(stripped.positions, vec![0, 1, 2]);

        let trailing = strip_with_mapping("a\x1b");
        assert_eq!(trailing.plain, "a\x1b");
    }

    #[test]
    fn multibyte_glyphs_map_to_their_first_byte() {
        let line = "\x1b[1mé漢\x1b[22mz";
        let stripped = strip_with_mapping(line);
        assert_eq!(stripped.plain, "é漢z");
        assert_eq!(stripped.positions, vec![4, 6, 14]);
        assert_eq!(stripped.raw_end_of(line, 1), 9);
        assert_eq!(visible_len(line), 3);
    }

    #[test]
    fn control_only_lines_have_empty_mapping() {
        let stripped = strip_with_mapping("\x1b[0m\x1b]8;;\x1b\\");
        assert!(stripped.is_empty());
        assert_eq!(stripped.plain, "");
    }

    #[test]
    fn tokens_never_split_a_control_sequence() {
        let line = "x\x1b[4;58;5;33my";
        let collected: Vec<_> = tokens(line).map(|(_, t)| t).collect();
        assert_eq!(
            collected,
            vec![
                Token::Glyph("x"),
                Token::Control("\x1b[4;58;5;33m"),
                Token::Glyph("y"),
            ]
        );
    }

    fn styled_line() -> impl Strategy<Value = String> {
        let piece = prop_oneof![
            "[a-z \\[\\]()é漢]{0,4}",
            Just("\x1b[31m".to_string()),
            Just("\x1b[0m".to_string()),
            Just("\x1b]8;;https://x.y\x1b\\".to_string()),
            Just("\x1b]8;;\x1b\\".to_string()),
            Just("\x1b".to_string()),
        ];
        prop::collection::vec(piece, 0..12).prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn mapping_length_matches_plain_char_count(line in styled_line()) {
            let stripped = strip_with_mapping(&line);
            prop_assert_eq!(stripped.positions.len(), stripped.plain.chars().count());
        }

        #[test]
        fn reinserting_glyphs_at_mapped_offsets_rebuilds_the_line(line in styled_line()) {
            let stripped = strip_with_mapping(&line);
            let mut rebuilt = String::new();
            let mut cursor = 0;
            for (ch, &offset) in stripped.plain.chars().zip(&stripped.positions) {
                rebuilt.push_str(&line[cursor..offset]);
                rebuilt.push(ch);
                cursor = offset + ch.len_utf8();
            }
            rebuilt.push_str(&line[cursor..]);
            prop_assert_eq!(rebuilt, line);
        }

        #[test]
        fn positions_increase_strictly(line in styled_line()) {
            let stripped = strip_with_mapping(&line);
            prop_assert!(stripped.positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
