//! Command driver: runs commands against one cache and renders the results

use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use lrucache::{CacheStats, LruCache, PutOutcome};
use serde::Serialize;
use tracing::debug;

use crate::command::{Command, Output};

/// Machine-readable view of a run
#[derive(Debug, Serialize, PartialEq)]
pub struct Report {
    pub operations: Vec<&'static str>,
    pub arguments: Vec<Vec<i64>>,
    pub results: Vec<Option<i32>>,
}

pub struct Driver {
    commands: Vec<Command>,
    outputs: Vec<Output>,
    cache: Option<LruCache>,
}

impl Driver {
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            outputs: Vec::with_capacity(commands.len()),
            commands,
            cache: None,
        }
    }

    /// Run every command in order, stopping at the first failure
    pub fn run(&mut self) -> Result<()> {
        for (i, &cmd) in self.commands.iter().enumerate() {
            let output = execute(&mut self.cache, cmd)
                .with_context(|| format!("command {} '{}' failed", i, cmd))?;
            debug!(%cmd, ?output, "executed");
            self.outputs.push(output);
        }
        Ok(())
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Statistics of the current cache, if one was created
    pub fn stats(&self) -> Option<&CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    /// Print the input listing and the results
    ///
    /// ```text
    /// Input
    /// ["LRUCache", "put", "get"]
    /// [[2], [1, 1], [1]]
    /// Output
    /// [null, null, 1]
    /// ```
    pub fn render_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Input")?;
        write_list(out, self.commands.iter().map(|c| format!("\"{}\"", c.name())))?;
        write_list(
            out,
            self.commands.iter().map(|c| {
                let args: Vec<String> = c.args().iter().map(|a| a.to_string()).collect();
                format!("[{}]", args.join(", "))
            }),
        )?;

        writeln!(out, "Output")?;
        write_list(out, self.outputs.iter().map(|o| o.render()))
    }

    pub fn report(&self) -> Report {
        Report {
            operations: self.commands.iter().map(|c| c.name()).collect(),
            arguments: self.commands.iter().map(|c| c.args()).collect(),
            results: self.outputs.iter().map(|o| o.value()).collect(),
        }
    }

    pub fn render_json<W: Write>(&self, out: &mut W) -> Result<()> {
        serde_json::to_writer(&mut *out, &self.report())?;
        writeln!(out)?;
        Ok(())
    }
}

fn execute(cache: &mut Option<LruCache>, cmd: Command) -> Result<Output> {
    match cmd {
        Command::Create { capacity } => {
            if let Some(old) = cache.take() {
                old.destroy();
            }
            *cache = Some(LruCache::try_new(capacity)?);
            Ok(Output::Null)
        }
        Command::Put { key, value } => {
            if let PutOutcome::Evicted { key: old_key, value: old_value } =
                current(cache)?.put(key, value)
            {
                debug!(key, old_key, old_value, "put evicted");
            }
            Ok(Output::Null)
        }
        Command::Get { key } => Ok(match current(cache)?.get(key) {
            Some(value) => Output::Value(value),
            None => Output::Missing,
        }),
    }
}

fn current(cache: &mut Option<LruCache>) -> Result<&mut LruCache> {
    cache
        .as_mut()
        .ok_or_else(|| anyhow!("no cache: a create command must come first"))
}

fn write_list<W: Write>(out: &mut W, items: impl Iterator<Item = String>) -> io::Result<()> {
    let items: Vec<String> = items.collect();
    writeln!(out, "[{}]", items.join(", "))
}
