//! Hierarchical names.
//!
//! Only what forwarding needs: parsing from a URI-ish string, prefix tests and
//! appending a component. Components are kept as plain strings.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Name(Vec<String>);

impl Name {
    /// The root name `/`.
    pub fn root() -> Self {
        Name(Vec::new())
    }

    /// Parse `/a/b/c`. Empty components are ignored, so `a/b`, `/a/b/` and
    /// `//a//b` are all the same two-component name.
    pub fn from_uri(uri: &str) -> Self {
        Name(
            uri.split('/')
                .filter(|c| !c.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    pub fn append(&self, component: impl Into<String>) -> Name {
        let mut comps = self.0.clone();
        comps.push(component.into());
        Name(comps)
    }

    /// First `n` components (the whole name when `n >= len`).
    pub fn prefix(&self, n: usize) -> Name {
        Name(self.0[..n.min(self.0.len())].to_vec())
    }

    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }
}

impl FromStr for Name {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Name::from_uri(s))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for c in &self.0 {
            write!(f, "/{c}")?;
        }
        Ok(())
    }
}
