//! `{name}` and `{name?default}` substitution, applied to equation text
//! before it is parsed.
//!
//! A block whose name parses as an integer is looked up as a 0-indexed
//! positional argument; anything else is looked up by name. Defaults may
//! themselves contain blocks.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use std::hash::BuildHasher;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariableError {
    #[error("Could not find the stat **{0}**")]
    MissingName(String),
    #[error("Missing argument **{0}**")]
    MissingIndex(usize),
    #[error("Too much recursion in the equation")]
    TooDeep,
}

/// Splits text into literal runs and balanced `{...}` blocks, in order.
///
/// An unclosed `{` or a stray `}` is kept as literal text.
pub fn split_variables(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut literal_start = 0;
    let mut block_start = 0;
    let mut level = 0usize;

    for (i, c) in text.char_indices() {
        match c {
            '{' => {
                if level == 0 {
                    block_start = i;
                }
                level += 1;
            }
            '}' if level > 0 => {
                level -= 1;
                if level == 0 {
                    if literal_start < block_start {
                        parts.push(&text[literal_start..block_start]);
                    }
                    parts.push(&text[block_start..=i]);
                    literal_start = i + 1;
                }
            }
            _ => {}
        }
    }
    if literal_start < text.len() {
        parts.push(&text[literal_start..]);
    }
    parts
}

/// The name and default of a `{...}` block, or `None` for literal text.
fn block(part: &str) -> Option<(&str, Option<&str>)> {
    let inner = part.strip_prefix('{')?.strip_suffix('}')?;
    Some(match inner.split_once('?') {
        Some((name, default)) => (name, Some(default)),
        None => (inner, None),
    })
}

/// Every name referenced in `text`, including inside defaults.
pub fn get_variables(text: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for (name, default) in split_variables(text).into_iter().filter_map(block) {
        names.insert(name.to_owned());
        if let Some(default) = default {
            names.extend(get_variables(default));
        }
    }
    names
}

/// Replaces every block in `text` once.
pub fn set_variables<V: Display, S: BuildHasher>(
    text: &str,
    args: &[V],
    named: &HashMap<String, V, S>,
) -> Result<String, VariableError> {
    let mut out = String::with_capacity(text.len());
    for part in split_variables(text) {
        let (name, default) = match block(part) {
            Some(b) => b,
            None => {
                out.push_str(part);
                continue;
            }
        };

        let found = match name.parse::<usize>() {
            Ok(index) => args.get(index).ok_or(VariableError::MissingIndex(index)),
            Err(_) => named
                .get(name)
                .ok_or_else(|| VariableError::MissingName(name.to_owned())),
        };

        match (found, default) {
            (Ok(value), _) => out.push_str(&value.to_string()),
            (Err(_), Some(default)) => out.push_str(&set_variables(default, args, named)?),
            (Err(err), None) => return Err(err),
        }
    }
    Ok(out)
}

/// Applies [set_variables] until no blocks remain, so values may refer to
/// other values. Gives up after `max_passes`.
pub fn set_all_variables<V: Display, S: BuildHasher>(
    text: &str,
    args: &[V],
    named: &HashMap<String, V, S>,
    max_passes: usize,
) -> Result<String, VariableError> {
    let mut text = text.to_owned();
    for _ in 0..max_passes {
        if !has_blocks(&text) {
            return Ok(text);
        }
        text = set_variables(&text, args, named)?;
    }
    if has_blocks(&text) {
        Err(VariableError::TooDeep)
    } else {
        Ok(text)
    }
}

fn has_blocks(text: &str) -> bool {
    split_variables(text).into_iter().any(|p| block(p).is_some())
}
