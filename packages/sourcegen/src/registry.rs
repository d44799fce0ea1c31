//! Generator registry and annotation matcher.
//!
//! The registry is an ordered list of descriptors. Dispatch is first-match:
//! the earliest descriptor whose kind restriction admits the declaration and
//! whose name matcher accepts the decorator name wins.

use regex::Regex;
use std::fmt;

use crate::generator::Generator;
use crate::syntax::{SyntaxKind, SyntaxKinds};

/// How a descriptor recognizes a decorator name.
#[derive(Clone)]
pub enum NameMatcher {
    /// Case-sensitive string equality.
    Exact(String),
    /// The leftmost match of the pattern must cover the entire name.
    Pattern(Regex),
}

impl NameMatcher {
    pub fn exact(name: impl Into<String>) -> Self {
        NameMatcher::Exact(name.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(NameMatcher::Pattern)
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Exact(expected) => expected == name,
            // A match that stops short of the end (or starts late) is rejected
            // even though the regex engine reports it as a hit.
            NameMatcher::Pattern(re) => re
                .find(name)
                .is_some_and(|m| m.start() == 0 && m.end() == name.len()),
        }
    }
}

impl fmt::Debug for NameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameMatcher::Exact(name) => f.debug_tuple("Exact").field(name).finish(),
            NameMatcher::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
        }
    }
}

impl fmt::Display for NameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameMatcher::Exact(name) => write!(f, "@{}", name),
            NameMatcher::Pattern(re) => write!(f, "@/{}/", re.as_str()),
        }
    }
}

/// A generator together with the rules deciding which declarations it owns.
pub struct GeneratorDescriptor {
    label: String,
    kinds: Option<SyntaxKinds>,
    matcher: NameMatcher,
    generator: Box<dyn Generator>,
}

impl GeneratorDescriptor {
    pub fn new(label: impl Into<String>, matcher: NameMatcher, generator: impl Generator + 'static) -> Self {
        Self {
            label: label.into(),
            kinds: None,
            matcher,
            generator: Box::new(generator),
        }
    }

    /// Descriptor matching decorators named exactly `name`.
    pub fn exact(
        label: impl Into<String>,
        name: impl Into<String>,
        generator: impl Generator + 'static,
    ) -> Self {
        Self::new(label, NameMatcher::exact(name), generator)
    }

    /// Descriptor matching decorators whose whole name matches `pattern`.
    pub fn pattern(label: impl Into<String>, pattern: Regex, generator: impl Generator + 'static) -> Self {
        Self::new(label, NameMatcher::Pattern(pattern), generator)
    }

    /// Restrict the descriptor to declarations of the given kinds.
    pub fn with_kinds(mut self, kinds: impl Into<SyntaxKinds>) -> Self {
        self.kinds = Some(kinds.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kinds(&self) -> Option<SyntaxKinds> {
        self.kinds
    }

    pub fn matcher(&self) -> &NameMatcher {
        &self.matcher
    }

    pub fn generator(&self) -> &dyn Generator {
        self.generator.as_ref()
    }

    /// Whether this descriptor claims a decorator `name` on a `kind` declaration.
    pub fn accepts(&self, name: &str, kind: SyntaxKind) -> bool {
        if let Some(kinds) = self.kinds {
            if !kinds.admits(kind) {
                return false;
            }
        }
        self.matcher.matches(name)
    }
}

impl fmt::Debug for GeneratorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorDescriptor")
            .field("label", &self.label)
            .field("kinds", &self.kinds)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

/// Ordered list of generator descriptors.
#[derive(Debug, Default)]
pub struct GeneratorRegistry {
    descriptors: Vec<GeneratorDescriptor>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor; it takes precedence below every earlier one.
    pub fn register(&mut self, descriptor: GeneratorDescriptor) -> usize {
        self.descriptors.push(descriptor);
        self.descriptors.len() - 1
    }

    pub fn with(mut self, descriptor: GeneratorDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, index: usize) -> Option<&GeneratorDescriptor> {
        self.descriptors.get(index)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratorDescriptor> {
        self.descriptors.iter()
    }

    /// Index of the first descriptor claiming a decorator `name` on a `kind`
    /// declaration.
    pub fn match_annotation(&self, name: &str, kind: SyntaxKind) -> Option<usize> {
        self.descriptors
            .iter()
            .position(|descriptor| descriptor.accepts(name, kind))
    }
}
