//! Command script parsing
//!
//! Two input forms are accepted. Call syntax, one call per command with
//! whitespace, `,` or `;` between calls:
//! ```text
//! LRUCache(2) put(1, 1) put(2, 2) get(1)
//! ```
//! and the two-array JSON form, operation names then argument lists:
//! ```text
//! ["LRUCache", "put", "put", "get"]
//! [[2], [1, 1], [2, 2], [1]]
//! ```
//! Input whose first non-blank character is `[` is read as JSON.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, one_of},
    combinator::{all_consuming, map_res, opt, recognize},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};
use serde::Deserialize;

use crate::command::Command;

/// Signed decimal integer
fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), str::parse)(input)
}

/// Command name: a letter followed by letters, digits or `_`
fn ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, many0(alt((alphanumeric1, tag("_"))))))(input)
}

/// `name(arg, arg, ...)`
fn call(input: &str) -> IResult<&str, (&str, Vec<i64>)> {
    pair(
        ident,
        delimited(
            preceded(multispace0, char('(')),
            separated_list0(char(','), delimited(multispace0, integer, multispace0)),
            preceded(multispace0, char(')')),
        ),
    )(input)
}

/// Whitespace with at most one `,` or `;`
fn separator(input: &str) -> IResult<&str, ()> {
    let (input, _) = tuple((multispace0, opt(one_of(",;")), multispace0))(input)?;
    Ok((input, ()))
}

/// Parse commands written in call syntax
pub fn parse_calls(input: &str) -> Result<Vec<Command>> {
    let calls = all_consuming(preceded(multispace0, many0(terminated(call, separator))))(input)
        .finish()
        .map(|(_, calls)| calls);

    let calls = match calls {
        Ok(calls) => calls,
        Err(e) => {
            let offset = input.len() - e.input.len();
            let near: String = e.input.chars().take(20).collect();
            bail!("parse error at offset {} near '{}'", offset, near);
        }
    };

    calls
        .into_iter()
        .map(|(name, args)| Command::from_call(name, &args))
        .collect()
}

/// Parse commands written as the two-array JSON form
pub fn parse_json(input: &str) -> Result<Vec<Command>> {
    let mut de = serde_json::Deserializer::from_str(input);
    let names = Vec::<String>::deserialize(&mut de).context("invalid operation list")?;
    let args = Vec::<Vec<i64>>::deserialize(&mut de).context("invalid argument list")?;
    de.end().context("trailing data after argument list")?;

    if names.len() != args.len() {
        bail!(
            "{} operations but {} argument lists",
            names.len(),
            args.len()
        );
    }

    names
        .iter()
        .zip(&args)
        .map(|(name, args)| Command::from_call(name, args))
        .collect()
}

/// Parse a script in either form
pub fn parse_script(input: &str) -> Result<Vec<Command>> {
    if input.trim_start().starts_with('[') {
        parse_json(input)
    } else {
        parse_calls(input)
    }
}

/// Read and parse a script file
pub fn read_script(path: &Path) -> Result<Vec<Command>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_script(&text).with_context(|| format!("failed to parse {}", path.display()))
}
