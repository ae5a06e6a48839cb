//! The active load order.
//!
//! A load order is the ordered list of plugins whose records are combined
//! into one world. A plugin's position in that list is what its raw form ids
//! resolve to, so the list must be complete before any plugin is parsed.
//! [`LoadOrder`] has no mutating methods: once constructed it is frozen, and
//! every [`FormIdResolver`] derived from it is a pure lookup table.
//!
//! ## plugins.txt format
//! One plugin file name per line. Blank lines and lines starting with `#` are
//! ignored. Newer launchers prefix *active* plugins with `*`; when any line
//! carries that prefix, unprefixed lines are inactive and dropped.
//!
//! ```text
//! # This file is used by the game to keep track of your downloaded content.
//! *Skyrim.esm
//! *Update.esm
//! Disabled.esp
//! *MyMod.esp
//! ```

use std::io::{BufRead, BufReader, Read};

use crate::form_id::FormIdResolver;
use crate::{Error, Result};

/// Frozen, ordered list of plugin file names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOrder {
    plugins: Vec<String>,
}

impl LoadOrder {
    /// Build a load order from plugin names, earliest first.
    ///
    /// Returns [`Error::LoadOrderTooLarge`] if there are more plugins than a
    /// resolved form id can address.
    pub fn new<I, S>(plugins: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let plugins: Vec<String> = plugins.into_iter().map(Into::into).collect();
        if plugins.len() > u16::MAX as usize {
            return Err(Error::LoadOrderTooLarge(plugins.len()));
        }
        Ok(Self { plugins })
    }

    /// Parse a `plugins.txt`-style list.
    pub fn from_plugins_txt<R: Read>(reader: R) -> Result<Self> {
        let buf = BufReader::new(reader);
        let mut lines = Vec::new();
        for line in buf.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            lines.push(line.to_owned());
        }

        let starred = lines.iter().any(|l| l.starts_with('*'));
        let plugins = lines.into_iter().filter_map(|l| match l.strip_prefix('*') {
            Some(name) => Some(name.trim().to_owned()),
            None if starred => None,
            None => Some(l),
        });
        Self::new(plugins)
    }

    /// Plugin names in order.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Position of `name` in the load order, compared case-insensitively.
    pub fn position(&self, name: &str) -> Option<u16> {
        self.plugins
            .iter()
            .position(|p| p.eq_ignore_ascii_case(name))
            .map(|i| i as u16)
    }

    /// Build the form id resolver for `plugin`, whose header lists `masters`.
    ///
    /// Fails if the plugin or any of its masters is not in the load order.
    pub fn resolver_for(&self, plugin: &str, masters: &[String]) -> Result<FormIdResolver> {
        let own = self
            .position(plugin)
            .ok_or_else(|| Error::UnknownPlugin(plugin.to_owned()))?;
        let masters = masters
            .iter()
            .map(|m| {
                self.position(m).ok_or_else(|| Error::MissingMaster {
                    plugin: plugin.to_owned(),
                    master: m.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FormIdResolver::new(masters, own))
    }
}
