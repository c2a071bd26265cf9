use crate::error::Result;
use std::collections::HashMap;
use std::fmt;

/// A fallback lookup consulted when a [Scope] has no static entry for a name.
pub trait Resolver<T> {
    fn resolve(&self, name: &str) -> Result<Option<T>>;
}

impl<T, F> Resolver<T> for F
where
    F: Fn(&str) -> Result<Option<T>>,
{
    fn resolve(&self, name: &str) -> Result<Option<T>> {
        self(name)
    }
}

/// Named values: static entries first, then each resolver in the order it was
/// added.
pub struct Scope<'r, T> {
    entries: HashMap<String, T>,
    resolvers: Vec<Box<dyn Resolver<T> + 'r>>,
}

impl<'r, T: Clone> Scope<'r, T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            resolvers: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Option<T> {
        self.entries.insert(name.into(), value)
    }

    pub fn push_resolver(&mut self, resolver: impl Resolver<T> + 'r) -> &mut Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn get(&self, name: &str) -> Result<Option<T>> {
        if let Some(value) = self.entries.get(name) {
            return Ok(Some(value.clone()));
        }
        for resolver in &self.resolvers {
            if let Some(value) = resolver.resolve(name)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }
}

impl<T: Clone> Default for Scope<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<(String, T)> for Scope<'_, T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            resolvers: Vec::new(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Scope<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("entries", &self.entries)
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}
