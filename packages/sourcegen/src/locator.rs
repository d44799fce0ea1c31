//! Target locator.
//!
//! One depth-first, pre-order pass over the tree that stops at the first
//! declaration a generator claims. Only one target is ever reported per pass:
//! rewriting it shifts every byte offset after it, so the caller re-parses
//! before looking again.

use tracing::debug;

use crate::registry::GeneratorRegistry;
use crate::syntax::{Annotation, Argument, Declaration, SyntaxTree};

/// A located target and the generator that claimed it.
#[derive(Debug, Clone, Copy)]
pub struct MatchRecord<'t> {
    pub generator_index: usize,
    pub target: &'t Declaration,
    pub annotation: &'t Annotation,
}

impl<'t> MatchRecord<'t> {
    /// Captured arguments: `None` for a bare decorator.
    pub fn arguments(&self) -> Option<&'t [Argument]> {
        self.annotation.arguments.as_deref()
    }
}

/// Find the first declaration, in document order, claimed by a generator.
pub fn find_target<'t>(tree: &'t SyntaxTree, registry: &GeneratorRegistry) -> Option<MatchRecord<'t>> {
    if registry.is_empty() {
        return None;
    }
    find_in_node(tree.root(), registry)
}

fn find_in_node<'t>(node: &'t Declaration, registry: &GeneratorRegistry) -> Option<MatchRecord<'t>> {
    if node.is_container() {
        // A matching container is handed over whole; its members wait for
        // the next pass.
        if let Some(found) = distribute(node, registry) {
            return Some(found);
        }

        for member in node.members() {
            if let Some(found) = distribute(member, registry) {
                return Some(found);
            }
            if let Some(found) = find_in_node(member, registry) {
                return Some(found);
            }
        }
        return None;
    }

    node.children
        .iter()
        .find_map(|child| find_in_node(child, registry))
}

/// Test a node's decorators in source order against the registry.
fn distribute<'t>(node: &'t Declaration, registry: &GeneratorRegistry) -> Option<MatchRecord<'t>> {
    node.annotations.iter().find_map(|annotation| {
        let generator_index = registry.match_annotation(&annotation.name, node.kind)?;
        debug!(
            annotation = %annotation.name,
            kind = %node.kind,
            span = %node.span,
            generator_index,
            "annotation claimed"
        );
        Some(MatchRecord {
            generator_index,
            target: node,
            annotation,
        })
    })
}
