//! Command line parser
//!
//! Splits a typed line into a command name and positional arguments.
//! Parsing never fails: anything that is not understood becomes part of a
//! word, and a blank line parses to the empty command name.
//!
//! 1. Words are separated by whitespace
//! 2. Single or double quotes group whitespace into one word
//! 3. An unterminated quote runs to the end of the line

use std::iter::Peekable;
use std::num::IntErrorKind;
use std::str::Chars;

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    /// First word; empty for a blank line
    pub name: String,
    /// Remaining words, in order
    pub args: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Positional argument `index`, if present
    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(|s| s.as_str())
    }
}

/// Tokenizer for command lines
struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn next_word(&mut self) -> Option<String> {
        self.skip_whitespace();
        self.chars.peek()?;

        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                c if c.is_whitespace() => break,
                // Quotes can appear mid-word: foo"bar baz"
                '"' | '\'' => {
                    self.chars.next();
                    self.read_quoted(c, &mut word);
                }
                _ => {
                    word.push(c);
                    self.chars.next();
                }
            }
        }
        Some(word)
    }

    fn read_quoted(&mut self, quote: char, word: &mut String) {
        for c in self.chars.by_ref() {
            if c == quote {
                return;
            }
            word.push(c);
        }
    }
}

/// Parse a command line
pub fn parse(input: &str) -> Command {
    let mut lexer = Lexer::new(input);
    let mut words = std::iter::from_fn(|| lexer.next_word());
    let name = words.next().unwrap_or_default();
    Command {
        name,
        args: words.collect(),
    }
}

/// Parse a positive count argument. Missing, zero, negative or non-numeric
/// input falls back to `default`; numbers too large for `u32` saturate.
pub fn parse_count(arg: Option<&str>, default: u32) -> u32 {
    let parsed = match arg.map(|s| s.trim().parse::<u32>()) {
        Some(Ok(n)) => Some(n),
        Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => Some(u32::MAX),
        _ => None,
    };
    parsed.filter(|&n| n > 0).unwrap_or(default)
}

/// Parse a record identifier (`cat 42`, `posts 7`)
pub fn parse_id(arg: &str) -> Option<u64> {
    arg.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ Simple Commands ============

    #[test]
    fn test_simple_command() {
        let cmd = parse("ls");
        assert_eq!(cmd.name, "ls");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_command_with_args() {
        let cmd = parse("ls 2 5");
        assert_eq!(cmd, Command::new("ls").arg("2").arg("5"));
        assert_eq!(cmd.get(1), Some("5"));
        assert_eq!(cmd.get(2), None);
    }

    #[test]
    fn test_extra_whitespace() {
        let cmd = parse("  search \t rust   2  ");
        assert_eq!(cmd.name, "search");
        assert_eq!(cmd.args, vec!["rust", "2"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Command::default());
        assert_eq!(parse("   "), Command::default());
    }

    // ============ Quoted Strings ============

    #[test]
    fn test_double_quoted_string() {
        let cmd = parse(r#"search "terminal theme" 2"#);
        assert_eq!(cmd.args, vec!["terminal theme", "2"]);
    }

    #[test]
    fn test_single_quoted_string() {
        let cmd = parse("search 'it\"s here'");
        assert_eq!(cmd.args, vec!["it\"s here"]);
    }

    #[test]
    fn test_quotes_mid_word() {
        let cmd = parse(r#"cat my"-"post"#);
        assert_eq!(cmd.args, vec!["my-post"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        let cmd = parse(r#"search "no end here"#);
        assert_eq!(cmd.args, vec!["no end here"]);
    }

    #[test]
    fn test_empty_quotes_are_a_word() {
        let cmd = parse(r#"search """#);
        assert_eq!(cmd.args, vec![""]);
    }

    // ============ Numeric Arguments ============

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(Some("3"), 1), 3);
        assert_eq!(parse_count(None, 1), 1);
        assert_eq!(parse_count(Some("abc"), 10), 10);
        assert_eq!(parse_count(Some("0"), 10), 10);
        assert_eq!(parse_count(Some("-2"), 10), 10);
        assert_eq!(parse_count(Some("2.5"), 10), 10);
        assert_eq!(parse_count(Some("99999999999"), 1), u32::MAX);
        assert_eq!(parse_count(Some("123456789012345678901234567890"), 1), u32::MAX);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("9999"), Some(9999));
        assert_eq!(parse_id("hello-world"), None);
        assert_eq!(parse_id(""), None);
    }
}
