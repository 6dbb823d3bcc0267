//! Parser for replay scripts.
//!
//! The top-level entry points are [`parse_str`] and [`parse_file`].

use crate::command::ScriptCommand;
use crate::commands::{
    Expect, KeyOpt, Press, Print, SendInput, SetProperty, Show, Start, Stop, TypeText, Wait,
};
use crate::event::KeyEvent;
use anyhow::{Context as _, Result, anyhow};
use std::path::Path;
use std::time::Duration;

/// Parse a replay script from a string slice and return the resulting commands.
///
/// Lines that are empty or start with `#` are ignored. Inline comments (` # …`)
/// are stripped while preserving `#` characters inside quoted strings.
///
/// # Errors
///
/// Returns an error if any line contains an unknown command, a malformed
/// argument, or an unclosed quoted string.
///
/// # Example
///
/// ```
/// use inputhook::parse_str;
///
/// let commands = parse_str("start\ntype \"hello\"\npress {Enter}\n").unwrap();
/// assert_eq!(commands.len(), 3);
/// ```
pub fn parse_str(content: &str) -> Result<Vec<Box<dyn ScriptCommand>>> {
    let mut commands = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = strip_inline_comment(line);
        let cmd = parse_line(line)
            .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;
        commands.push(cmd);
    }
    Ok(commands)
}

/// Parse a replay script from a file and return the resulting commands.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if the script is malformed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Box<dyn ScriptCommand>>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))?;
    parse_str(&content)
}

type ParseFn = fn(&str) -> Result<Box<dyn ScriptCommand>>;

static REGISTRY: &[(&str, ParseFn)] = &[
    (Start::NAME, Start::parse_boxed),
    (Stop::NAME, Stop::parse_boxed),
    (Press::NAME, Press::parse_boxed),
    (TypeText::NAME, TypeText::parse_boxed),
    (SendInput::NAME, SendInput::parse_boxed),
    (KeyOpt::NAME, KeyOpt::parse_boxed),
    (SetProperty::NAME, SetProperty::parse_boxed),
    (Print::NAME, Print::parse_boxed),
    (Show::NAME, Show::parse_boxed),
    (Wait::NAME, Wait::parse_boxed),
    (Expect::NAME, Expect::parse_boxed),
];

/// Dispatch a single non-empty, non-comment line to the matching command's parser.
fn parse_line(line: &str) -> Result<Box<dyn ScriptCommand>> {
    let (name, args) = line.split_once(' ').unwrap_or((line, ""));
    REGISTRY
        .iter()
        .find(|(cmd_name, _)| cmd_name.eq_ignore_ascii_case(name))
        .map(|(_, parse)| parse(args))
        .unwrap_or_else(|| Err(anyhow!("Unknown command: {}", line)))
}

/// Strip inline comments from a line, preserving `#` inside quoted strings.
fn strip_inline_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if ch == '#' && !in_quotes {
            return line[..i].trim();
        }
    }
    line
}

/// Parse a duration string: `1s`, `500ms`, `1.5s`.
pub(crate) fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(ms_str) = s.strip_suffix("ms") {
        let ms: u64 = ms_str
            .trim()
            .parse()
            .context("Invalid milliseconds value")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(s_str) = s.strip_suffix('s') {
        let secs: f64 = s_str.trim().parse().context("Invalid seconds value")?;
        Duration::try_from_secs_f64(secs).context("Invalid seconds value")
    } else {
        Err(anyhow!("Duration must end with 's' or 'ms', got: {}", s))
    }
}

/// Parse a double-quoted string, processing `\n`, `\t`, `\"`, and `\\`.
pub(crate) fn parse_quoted_string(s: &str) -> Result<String> {
    let s = s.trim();
    if !s.starts_with('"') {
        return Err(anyhow!("Expected string to start with '\"'"));
    }
    if s.len() < 2 || !s.ends_with('"') {
        return Err(anyhow!("Expected string to end with '\"'"));
    }
    Ok(s[1..s.len() - 1]
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\"))
}

/// Split an argument string into words and quoted strings.
///
/// Quoted arguments are unescaped with [`parse_quoted_string`].
pub(crate) fn split_args(args: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let mut rest = args.trim_start();
    while !rest.is_empty() {
        if rest.starts_with('"') {
            // Locate the closing quote, respecting backslash escapes.
            let mut escaped = false;
            let mut end_idx = None;
            for (i, ch) in rest.char_indices().skip(1) {
                if escaped {
                    escaped = false;
                    continue;
                }
                if ch == '\\' {
                    escaped = true;
                    continue;
                }
                if ch == '"' {
                    end_idx = Some(i);
                    break;
                }
            }
            let end_idx = end_idx.ok_or_else(|| anyhow!("Unclosed quote in: {}", args))?;
            out.push(parse_quoted_string(&rest[..=end_idx])?);
            rest = rest[end_idx + 1..].trim_start();
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            out.push(rest[..end].to_string());
            rest = rest[end..].trim_start();
        }
    }
    Ok(out)
}

/// Parse a key written as `{Name}` or a single character.
pub(crate) fn parse_key(s: &str) -> Result<KeyEvent> {
    let s = s.trim();
    if let Some(name) = s.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
        if name.is_empty() {
            return Err(anyhow!("Empty key name"));
        }
        return Ok(KeyEvent::named(name));
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(KeyEvent::char(ch)),
        _ => Err(anyhow!("Expected a single character or {{Name}}, got: {}", s)),
    }
}

/// Parse an optional send level argument.
pub(crate) fn parse_level(arg: Option<&String>) -> Result<u8> {
    match arg {
        None => Ok(0),
        Some(level) => level
            .parse::<u8>()
            .ok()
            .filter(|level| *level <= crate::options::MAX_SEND_LEVEL)
            .ok_or_else(|| anyhow!("Send level must be 0-100, got: {}", level)),
    }
}
