//! Ordered list of phrases that end a session when typed.

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchList {
    phrases: Vec<String>,
}

impl MatchList {
    /// Parse a comma-separated list. `,,` is a literal comma, spaces are kept
    /// and empty phrases are skipped.
    pub fn parse(list: &str) -> Result<Self> {
        let mut phrases = Vec::new();
        let mut current = String::new();
        let mut chars = list.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != ',' {
                current.push(ch);
            } else if chars.peek() == Some(&',') {
                chars.next();
                current.push(',');
            } else if !current.is_empty() {
                phrases.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            phrases.push(current);
        }
        Ok(MatchList { phrases })
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.phrases.get(index).map(String::as_str)
    }

    /// Index of the first phrase that ends `buffer` (or occurs anywhere in it
    /// when `anywhere` is set).
    pub fn find(&self, buffer: &[char], anywhere: bool, case_sensitive: bool) -> Option<usize> {
        self.phrases.iter().position(|phrase| {
            let phrase: Vec<char> = phrase.chars().collect();
            if phrase.len() > buffer.len() {
                return false;
            }
            if anywhere {
                buffer
                    .windows(phrase.len())
                    .any(|window| same_text(window, &phrase, case_sensitive))
            } else {
                same_text(&buffer[buffer.len() - phrase.len()..], &phrase, case_sensitive)
            }
        })
    }
}

fn same_text(a: &[char], b: &[char], case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.iter()
            .zip(b)
            .all(|(x, y)| x == y || x.to_lowercase().eq(y.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_parse() {
        let list = MatchList::parse("foo,bar baz,,,").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0), Some("foo"));
        assert_eq!(list.get(1), Some("bar baz,"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(MatchList::parse("").unwrap().is_empty());
        assert!(MatchList::parse(",,").unwrap().get(0) == Some(","));
    }

    #[test]
    fn test_suffix_match() {
        let list = MatchList::parse("foo,bar").unwrap();
        assert_eq!(list.find(&chars("xxfoo"), false, false), Some(0));
        assert_eq!(list.find(&chars("xxbar"), false, false), Some(1));
        assert_eq!(list.find(&chars("fooxx"), false, false), None);
        assert_eq!(list.find(&chars("fo"), false, false), None);
    }

    #[test]
    fn test_anywhere_match() {
        let list = MatchList::parse("foo,bar").unwrap();
        assert_eq!(list.find(&chars("xxfooyy"), true, false), Some(0));
        assert_eq!(list.find(&chars("barfoo"), true, false), Some(0));
    }

    #[test]
    fn test_first_in_list_order_wins() {
        let list = MatchList::parse("oo,foo").unwrap();
        assert_eq!(list.find(&chars("foo"), false, false), Some(0));
    }

    #[test]
    fn test_case_folding() {
        let list = MatchList::parse("Foo").unwrap();
        assert_eq!(list.find(&chars("xFOO"), false, false), Some(0));
        assert_eq!(list.find(&chars("xFOO"), false, true), None);
        assert_eq!(list.find(&chars("xFoo"), false, true), Some(0));
    }
}
