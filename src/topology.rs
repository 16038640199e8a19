//! The fixed endpoint topology of the Get Satisfaction API.

use crate::endpoint::{EndpointTree, NodeId, NodeKind};
use crate::error::Result;
use crate::resource::ResourceKind;

/// One endpoint declaration: where it hangs, its segment, and what it yields.
#[derive(Debug, Clone, Copy)]
pub struct Declaration {
    pub parent: &'static [&'static str],
    pub segment: &'static str,
    pub kind: NodeKind,
    pub resource: ResourceKind,
}

const fn decl(
    parent: &'static [&'static str],
    segment: &'static str,
    kind: NodeKind,
    resource: ResourceKind,
) -> Declaration {
    Declaration {
        parent,
        segment,
        kind,
        resource,
    }
}

use NodeKind::{Collection, Relation};
use ResourceKind::{Comment, Company, Person, Product, Reply, Tag, Topic};

/// Every endpoint the client knows about. Parents precede their children.
pub const TOPOLOGY: &[Declaration] = &[
    decl(&[], "companies", Collection, Company),
    decl(&[], "products", Collection, Product),
    decl(&[], "topics", Collection, Topic),
    decl(&[], "people", Collection, Person),
    decl(&[], "replies", Collection, Reply),
    decl(&[], "tags", Collection, Tag),
    // companies/{company}/...
    decl(&["companies"], "employees", Relation, Person),
    decl(&["companies"], "products", Collection, Product),
    decl(&["companies", "products"], "topics", Relation, Topic),
    decl(&["companies"], "tags", Collection, Tag),
    decl(&["companies", "tags"], "topics", Relation, Topic),
    decl(&["companies"], "topics", Collection, Topic),
    decl(&["companies"], "people", Relation, Person),
    // people/{person}/...
    decl(&["people"], "products", Relation, Product),
    decl(&["people"], "followed/topics", Relation, Topic),
    decl(&["people"], "replies", Relation, Reply),
    decl(&["people"], "topics", Relation, Topic),
    decl(&["people"], "companies", Relation, Company),
    // products/{product}/...
    decl(&["products"], "companies", Relation, Company),
    decl(&["products"], "topics", Relation, Topic),
    // replies/{reply}/...
    decl(&["replies"], "comments", Relation, Comment),
    // topics/{topic}/...
    decl(&["topics"], "people", Relation, Person),
    decl(&["topics"], "products", Relation, Product),
    decl(&["topics"], "comments", Relation, Comment),
    decl(&["topics"], "replies", Relation, Reply),
];

/// Build a fresh endpoint tree from [`TOPOLOGY`].
///
/// Each call returns an independent tree; identifiers applied to one never
/// leak into another.
pub fn build() -> Result<EndpointTree> {
    build_from(TOPOLOGY)
}

/// Build a tree from an arbitrary declaration table.
pub fn build_from(declarations: &[Declaration]) -> Result<EndpointTree> {
    let mut tree = EndpointTree::new();
    for d in declarations {
        let parent = locate(&tree, d.parent)?;
        tree.register_child(d.segment, d.kind, d.resource, parent)?;
    }
    tracing::debug!(endpoints = declarations.len(), "built endpoint tree");
    Ok(tree)
}

fn locate(tree: &EndpointTree, path: &[&str]) -> Result<Option<NodeId>> {
    let mut current = None;
    for name in path {
        current = Some(match current {
            Some(parent) => tree.child(parent, name)?,
            None => tree.top(name)?,
        });
    }
    Ok(current)
}
