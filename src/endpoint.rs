//! The endpoint tree.
//!
//! Endpoints are stored in an arena and addressed by [`NodeId`]. A node's
//! URL path is derived by walking its parent links: each ancestor contributes
//! its segment followed by its identifier, if one has been applied.
//!
//! Collection nodes must be narrowed with an identifier before anything
//! beneath them can be addressed; `companies/products` is meaningless, while
//! `companies/acme/products` is not.
//!
//! Applying an identifier mutates the tree, so it takes `&mut self`. Build one
//! tree per session rather than sharing a filtered tree between requests.

use std::collections::BTreeMap;

use crate::error::{GetSatError, Result};
use crate::resource::ResourceKind;

/// Index of a node within an [`EndpointTree`].
///
/// Ids are local to the tree that issued them. Accessors panic on an id from
/// another tree; check with [`EndpointTree::contains`] when ids cross trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// How a node behaves with respect to identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Yields many resources until narrowed to one by an identifier.
    Collection,
    /// A sub-collection that cannot be narrowed. Yields many resources but
    /// never blocks traversal.
    Relation,
}

/// Number of resources an endpoint addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

#[derive(Debug, Clone)]
struct EndpointNode {
    segment: String,
    kind: NodeKind,
    resource: ResourceKind,
    parent: Option<NodeId>,
    filter: Option<String>,
    children: BTreeMap<String, NodeId>,
}

impl EndpointNode {
    fn is_unfiltered_collection(&self) -> bool {
        self.kind == NodeKind::Collection && self.filter.is_none()
    }
}

/// A tree of API endpoints.
#[derive(Debug, Clone, Default)]
pub struct EndpointTree {
    nodes: Vec<EndpointNode>,
    roots: BTreeMap<String, NodeId>,
}

impl EndpointTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a node under `parent`, or at the top level when `parent` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`GetSatError::Configuration`] if the segment is empty or the
    /// parent already has a child with the same name.
    pub fn register_child(
        &mut self,
        segment: &str,
        kind: NodeKind,
        resource: ResourceKind,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        if segment.is_empty() {
            return Err(GetSatError::Configuration(
                "endpoint segment must not be empty".to_string(),
            ));
        }

        let taken = match parent {
            Some(p) => self.node(p).children.contains_key(segment),
            None => self.roots.contains_key(segment),
        };
        if taken {
            let owner = parent.map_or_else(|| "<root>".to_string(), |p| self.template(p));
            return Err(GetSatError::Configuration(format!(
                "duplicate endpoint '{segment}' under '{owner}'"
            )));
        }

        let id = NodeId(self.nodes.len());
        match parent {
            Some(p) => self.nodes[p.0].children.insert(segment.to_string(), id),
            None => self.roots.insert(segment.to_string(), id),
        };

        self.nodes.push(EndpointNode {
            segment: segment.to_string(),
            kind,
            resource,
            parent,
            filter: None,
            children: BTreeMap::new(),
        });
        Ok(id)
    }

    /// Look up a top-level endpoint by name.
    pub fn top(&self, name: &str) -> Result<NodeId> {
        self.roots
            .get(name)
            .copied()
            .ok_or_else(|| GetSatError::UnknownEndpoint {
                parent: "<root>".to_string(),
                name: name.to_string(),
            })
    }

    /// Look up a named child of `parent`.
    pub fn child(&self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.node(parent)
            .children
            .get(name)
            .copied()
            .ok_or_else(|| GetSatError::UnknownEndpoint {
                parent: self.template(parent),
                name: name.to_string(),
            })
    }

    /// Names of the children registered on `parent`.
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = &str> {
        self.node(parent).children.keys().map(String::as_str)
    }

    /// All nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn resource(&self, id: NodeId) -> ResourceKind {
        self.node(id).resource
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn filter(&self, id: NodeId) -> Option<&str> {
        self.node(id).filter.as_deref()
    }

    /// Narrow a collection node to a single member.
    ///
    /// Every holder of `id` observes the new identifier. Re-applying the same
    /// identifier is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GetSatError::Configuration`] if the node is not a collection
    /// or the identifier is empty.
    pub fn apply_filter(&mut self, id: NodeId, identifier: &str) -> Result<SingularEndpoint<'_>> {
        if identifier.is_empty() {
            return Err(GetSatError::Configuration(
                "endpoint identifier must not be empty".to_string(),
            ));
        }
        // URL joining would collapse these into a different path.
        if identifier == "." || identifier == ".." {
            return Err(GetSatError::Configuration(format!(
                "endpoint identifier '{identifier}' is not allowed"
            )));
        }
        if self.node(id).kind != NodeKind::Collection {
            return Err(GetSatError::Configuration(format!(
                "endpoint '{}' does not accept an identifier",
                self.template(id)
            )));
        }
        self.nodes[id.0].filter = Some(identifier.to_string());
        Ok(SingularEndpoint { tree: self, id })
    }

    /// Remove any identifier from `id`, returning it to a collection.
    pub fn clear_filter(&mut self, id: NodeId) {
        self.nodes[id.0].filter = None;
    }

    /// Walk from the top level through `steps`, applying or clearing the
    /// identifier on each collection along the way.
    pub fn navigate(&mut self, steps: &[(&str, Option<&str>)]) -> Result<NodeId> {
        let mut current: Option<NodeId> = None;
        for (name, identifier) in steps {
            let id = match current {
                Some(parent) => self.child(parent, name)?,
                None => self.top(name)?,
            };
            match identifier {
                Some(identifier) => {
                    self.apply_filter(id, identifier)?;
                }
                None => self.clear_filter(id),
            }
            current = Some(id);
        }
        current.ok_or_else(|| {
            GetSatError::Configuration("at least one endpoint is required".to_string())
        })
    }

    /// `Many` for a relation or an unfiltered collection, `One` for a
    /// collection narrowed by an identifier.
    pub fn cardinality(&self, id: NodeId) -> Cardinality {
        let node = self.node(id);
        match node.kind {
            NodeKind::Relation => Cardinality::Many,
            NodeKind::Collection if node.filter.is_none() => Cardinality::Many,
            NodeKind::Collection => Cardinality::One,
        }
    }

    /// Resolve the URL path of `id`, without the `.json` extension.
    ///
    /// # Errors
    ///
    /// Returns [`GetSatError::Traversal`] if any ancestor is a collection
    /// without an identifier.
    pub fn resolve_path(&self, id: NodeId) -> Result<String> {
        let mut chain = vec![self.node(id)];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            let node = self.node(parent);
            if node.is_unfiltered_collection() {
                return Err(GetSatError::Traversal {
                    segment: node.segment.clone(),
                });
            }
            chain.push(node);
            current = node.parent;
        }

        let mut parts = Vec::with_capacity(chain.len() * 2);
        for node in chain.into_iter().rev() {
            parts.push(node.segment.clone());
            if let Some(filter) = &node.filter {
                parts.push(urlencoding::encode(filter).into_owned());
            }
        }
        Ok(parts.join("/"))
    }

    /// The path of `id` with `{id}` marking every collection above it.
    pub fn template(&self, id: NodeId) -> String {
        let mut parts = vec![self.node(id).segment.as_str()];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            let node = self.node(parent);
            if node.kind == NodeKind::Collection {
                parts.push("{id}");
            }
            parts.push(&node.segment);
            current = node.parent;
        }
        parts.reverse();
        parts.join("/")
    }

    /// A typed view of `id` according to what it currently yields.
    pub fn endpoint(&self, id: NodeId) -> Endpoint<'_> {
        match self.cardinality(id) {
            Cardinality::Many => Endpoint::Collection(CollectionEndpoint { tree: self, id }),
            Cardinality::One => Endpoint::Singular(SingularEndpoint { tree: self, id }),
        }
    }

    /// Whether `id` was issued by this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    fn node(&self, id: NodeId) -> &EndpointNode {
        &self.nodes[id.0]
    }
}

/// An endpoint that yields many resources.
#[derive(Debug, Clone, Copy)]
pub struct CollectionEndpoint<'t> {
    tree: &'t EndpointTree,
    id: NodeId,
}

/// An endpoint that yields exactly one resource.
#[derive(Debug, Clone, Copy)]
pub struct SingularEndpoint<'t> {
    tree: &'t EndpointTree,
    id: NodeId,
}

/// A resolved endpoint, tagged by what it yields.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint<'t> {
    Collection(CollectionEndpoint<'t>),
    Singular(SingularEndpoint<'t>),
}

macro_rules! endpoint_view {
    ($ty:ident) => {
        impl<'t> $ty<'t> {
            pub fn id(&self) -> NodeId {
                self.id
            }

            pub fn resource(&self) -> ResourceKind {
                self.tree.resource(self.id)
            }

            /// Resolved URL path, without the `.json` extension.
            pub fn path(&self) -> Result<String> {
                self.tree.resolve_path(self.id)
            }

            /// View a named child of this endpoint.
            pub fn child(&self, name: &str) -> Result<Endpoint<'t>> {
                let id = self.tree.child(self.id, name)?;
                Ok(self.tree.endpoint(id))
            }
        }
    };
}

endpoint_view!(CollectionEndpoint);
endpoint_view!(SingularEndpoint);

impl<'t> Endpoint<'t> {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Collection(e) => e.id,
            Self::Singular(e) => e.id,
        }
    }

    pub fn resource(&self) -> ResourceKind {
        match self {
            Self::Collection(e) => e.resource(),
            Self::Singular(e) => e.resource(),
        }
    }

    pub fn path(&self) -> Result<String> {
        match self {
            Self::Collection(e) => e.path(),
            Self::Singular(e) => e.path(),
        }
    }

    pub fn child(&self, name: &str) -> Result<Endpoint<'t>> {
        match self {
            Self::Collection(e) => e.child(name),
            Self::Singular(e) => e.child(name),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(parent_kind: NodeKind, child_kind: NodeKind) -> (EndpointTree, NodeId, NodeId) {
        let mut tree = EndpointTree::new();
        let a = tree
            .register_child("a", parent_kind, ResourceKind::Topic, None)
            .unwrap();
        let b = tree
            .register_child("b", child_kind, ResourceKind::Topic, Some(a))
            .unwrap();
        (tree, a, b)
    }

    #[test]
    fn test_path_of_top_level_node() {
        let mut tree = EndpointTree::new();
        let id = tree
            .register_child("path", NodeKind::Relation, ResourceKind::Topic, None)
            .unwrap();
        assert_eq!(tree.resolve_path(id).unwrap(), "path");
    }

    #[test]
    fn test_path_with_plain_parent() {
        let (tree, _, b) = tree_with(NodeKind::Relation, NodeKind::Relation);
        assert_eq!(tree.resolve_path(b).unwrap(), "a/b");
    }

    #[test]
    fn test_unfiltered_collection_parent_is_traversal_error() {
        let (tree, _, b) = tree_with(NodeKind::Collection, NodeKind::Relation);
        let err = tree.resolve_path(b).unwrap_err();
        assert!(matches!(err, GetSatError::Traversal { ref segment } if segment == "a"));
    }

    #[test]
    fn test_filtered_collection_parent_is_spliced_in() {
        let (mut tree, a, b) = tree_with(NodeKind::Collection, NodeKind::Relation);
        tree.apply_filter(a, "fun").unwrap();
        assert_eq!(tree.resolve_path(b).unwrap(), "a/fun/b");
    }

    #[test]
    fn test_filtered_node_path_includes_identifier() {
        let (mut tree, a, _) = tree_with(NodeKind::Collection, NodeKind::Relation);
        assert_eq!(tree.resolve_path(a).unwrap(), "a");
        let singular = tree.apply_filter(a, "fun").unwrap();
        assert_eq!(singular.path().unwrap(), "a/fun");
    }

    #[test]
    fn test_unfiltered_grandparent_is_traversal_error() {
        let mut tree = EndpointTree::new();
        let companies = tree
            .register_child("companies", NodeKind::Collection, ResourceKind::Company, None)
            .unwrap();
        let products = tree
            .register_child("products", NodeKind::Collection, ResourceKind::Product, Some(companies))
            .unwrap();
        let topics = tree
            .register_child("topics", NodeKind::Relation, ResourceKind::Topic, Some(products))
            .unwrap();

        tree.apply_filter(products, "widget").unwrap();
        assert!(matches!(
            tree.resolve_path(topics),
            Err(GetSatError::Traversal { ref segment }) if segment == "companies"
        ));

        tree.apply_filter(companies, "acme").unwrap();
        assert_eq!(
            tree.resolve_path(topics).unwrap(),
            "companies/acme/products/widget/topics"
        );
    }

    #[test]
    fn test_relation_parent_does_not_block_traversal() {
        let (tree, _, b) = tree_with(NodeKind::Relation, NodeKind::Relation);
        assert_eq!(tree.resolve_path(b).unwrap(), "a/b");
    }

    #[test]
    fn test_cardinality_flips_when_filtered() {
        let (mut tree, a, b) = tree_with(NodeKind::Collection, NodeKind::Relation);
        assert_eq!(tree.cardinality(a), Cardinality::Many);
        assert_eq!(tree.cardinality(b), Cardinality::Many);

        tree.apply_filter(a, "fun").unwrap();
        assert_eq!(tree.cardinality(a), Cardinality::One);

        tree.apply_filter(a, "fun").unwrap();
        assert_eq!(tree.cardinality(a), Cardinality::One);
        assert_eq!(tree.resolve_path(a).unwrap(), "a/fun");

        assert_eq!(tree.cardinality(b), Cardinality::Many);

        tree.clear_filter(a);
        assert_eq!(tree.cardinality(a), Cardinality::Many);
    }

    #[test]
    fn test_duplicate_child_is_configuration_error() {
        let (mut tree, a, _) = tree_with(NodeKind::Collection, NodeKind::Relation);
        let err = tree
            .register_child("b", NodeKind::Relation, ResourceKind::Tag, Some(a))
            .unwrap_err();
        assert!(matches!(err, GetSatError::Configuration(_)));

        let err = tree
            .register_child("a", NodeKind::Relation, ResourceKind::Tag, None)
            .unwrap_err();
        assert!(matches!(err, GetSatError::Configuration(_)));
    }

    #[test]
    fn test_same_name_under_different_parents_is_allowed() {
        let mut tree = EndpointTree::new();
        let a = tree
            .register_child("a", NodeKind::Collection, ResourceKind::Company, None)
            .unwrap();
        let b = tree
            .register_child("b", NodeKind::Collection, ResourceKind::Company, None)
            .unwrap();
        assert!(tree
            .register_child("topics", NodeKind::Relation, ResourceKind::Topic, Some(a))
            .is_ok());
        assert!(tree
            .register_child("topics", NodeKind::Relation, ResourceKind::Topic, Some(b))
            .is_ok());
    }

    #[test]
    fn test_filter_on_non_collection_is_rejected() {
        let (mut tree, _, b) = tree_with(NodeKind::Collection, NodeKind::Relation);
        assert!(matches!(
            tree.apply_filter(b, "x"),
            Err(GetSatError::Configuration(_))
        ));
    }

    #[test]
    fn test_identifier_is_percent_encoded() {
        let (mut tree, a, _) = tree_with(NodeKind::Collection, NodeKind::Relation);
        let singular = tree.apply_filter(a, "a b/c").unwrap();
        assert_eq!(singular.path().unwrap(), "a/a%20b%2Fc");
    }

    #[test]
    fn test_dot_identifiers_are_rejected() {
        let (mut tree, a, b) = tree_with(NodeKind::Collection, NodeKind::Relation);
        for identifier in [".", ".."] {
            assert!(matches!(
                tree.apply_filter(a, identifier),
                Err(GetSatError::Configuration(_))
            ));
        }
        assert_eq!(tree.filter(a), None);
        assert!(matches!(
            tree.navigate(&[("a", Some("..")), ("b", None)]),
            Err(GetSatError::Configuration(_))
        ));
        assert!(matches!(tree.resolve_path(b), Err(GetSatError::Traversal { .. })));

        let singular = tree.apply_filter(a, "...").unwrap();
        assert_eq!(singular.path().unwrap(), "a/...");
    }

    #[test]
    fn test_ids_are_tree_local() {
        let (tree, _, b) = tree_with(NodeKind::Collection, NodeKind::Relation);
        assert!(tree.contains(b));
        assert!(!EndpointTree::new().contains(b));
    }

    #[test]
    fn test_endpoint_view_tags_by_yield() {
        let (mut tree, a, b) = tree_with(NodeKind::Collection, NodeKind::Relation);
        assert!(tree.endpoint(a).is_collection());
        assert!(tree.endpoint(b).is_collection());

        tree.apply_filter(a, "fun").unwrap();
        assert!(!tree.endpoint(a).is_collection());

        let child = tree.endpoint(a).child("b").unwrap();
        assert_eq!(child.path().unwrap(), "a/fun/b");
    }

    #[test]
    fn test_navigate_applies_identifiers() {
        let (mut tree, a, b) = tree_with(NodeKind::Collection, NodeKind::Relation);
        let found = tree.navigate(&[("a", Some("fun")), ("b", None)]).unwrap();
        assert_eq!(found, b);
        assert_eq!(tree.filter(a), Some("fun"));
        assert_eq!(tree.resolve_path(found).unwrap(), "a/fun/b");
    }

    #[test]
    fn test_navigate_unknown_child() {
        let (mut tree, _, _) = tree_with(NodeKind::Collection, NodeKind::Relation);
        let err = tree.navigate(&[("a", Some("x")), ("nope", None)]).unwrap_err();
        assert!(matches!(err, GetSatError::UnknownEndpoint { .. }));
    }

    #[test]
    fn test_template_marks_collections() {
        let (tree, _, b) = tree_with(NodeKind::Collection, NodeKind::Relation);
        assert_eq!(tree.template(b), "a/{id}/b");
    }
}
