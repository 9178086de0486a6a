//! Breakpoint variables.
//!
//! The compiler writes `@media #{ghostkitvar:media_sm}`; the concrete condition is
//! only substituted when CSS is displayed, so changing breakpoint sizes never
//! requires recompiling stored styles.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};

use crate::options::{default_media_sizes, StyleOptions};
use crate::tree::MEDIA_PREFIX;

pub const VAR_TOKEN_PREFIX: &str = "#{ghostkitvar:";

lazy_static! {
    static ref VAR_TOKEN: Regex = Regex::new(r"#\{ghostkitvar:([^}\s]+)\}").unwrap();
}

pub fn variable_token(name: &str) -> String {
    format!("{}{}}}", VAR_TOKEN_PREFIX, name)
}

/// Placeholder for a `media_<breakpoint>` wrapper.
pub fn breakpoint_placeholder(breakpoint: &str) -> String {
    variable_token(&format!("{}{}", MEDIA_PREFIX, breakpoint))
}

pub trait VariableResolver: Sync {
    fn resolve(&self, name: &str) -> Option<String>;
}

impl VariableResolver for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Max-width breakpoints keyed by variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSizes {
    sizes: BTreeMap<String, u32>,
}

impl Default for MediaSizes {
    fn default() -> Self {
        MediaSizes {
            sizes: default_media_sizes(),
        }
    }
}

impl MediaSizes {
    pub fn new(sizes: BTreeMap<String, u32>) -> Self {
        MediaSizes { sizes }
    }

    pub fn from_options(options: &StyleOptions) -> Self {
        Self::new(options.media_sizes.clone())
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.sizes.get(name).copied()
    }
}

impl VariableResolver for MediaSizes {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).map(|px| format!("(max-width: {}px)", px))
    }
}

/// Substitute every variable token the resolver knows; unknown tokens are kept.
pub fn replace_vars(css: &str, resolver: &dyn VariableResolver) -> String {
    VAR_TOKEN
        .replace_all(css, |caps: &Captures| {
            resolver
                .resolve(&caps[1])
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
