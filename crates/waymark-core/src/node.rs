//! Routing trie.
//!
//! Each node can terminate up to three routes: one that ends exactly here,
//! one that ends here with a trailing slash, and one whose multi-segment
//! wildcard swallows everything below. Children are reached either through
//! an exact literal segment or through the single dynamic branch shared by
//! every `{name}` wildcard at this depth.

use crate::branches::Branches;
use crate::pattern::Segment;

/// Index of a route in the router's route table.
pub type RouteId = usize;

/// A slot that was already taken by another route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupied(pub RouteId);

/// A trie vertex.
#[derive(Debug, Default)]
pub struct Node {
    leaf: Option<RouteId>,
    trailing_slash_leaf: Option<RouteId>,
    terminal_leaf: Option<RouteId>,
    branches: Branches<Node>,
    dynamic_branch: Option<Box<Node>>,
}

impl Node {
    /// Create an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `route` along `segments` below this node.
    ///
    /// # Errors
    ///
    /// Returns the route already occupying the terminal slot.
    pub fn grow(&mut self, route: RouteId, segments: &[Segment]) -> Result<(), Occupied> {
        let Some((first, rest)) = segments.split_first() else {
            return occupy(&mut self.leaf, route);
        };

        match first {
            Segment::TrailingSlash => occupy(&mut self.trailing_slash_leaf, route),
            Segment::Multi(_) => occupy(&mut self.terminal_leaf, route),
            Segment::Literal(text) => self
                .branches
                .get_or_insert_with(text, Node::new)
                .grow(route, rest),
            Segment::Single(_) => self
                .dynamic_branch
                .get_or_insert_with(Box::default)
                .grow(route, rest),
        }
    }

    /// Find the route matching `path` below this node.
    ///
    /// `path` is the unconsumed part of the request path: empty, or starting
    /// with `/`. Values bound by single wildcards are pushed onto `captures`
    /// in path order; the remainder swallowed by a multi wildcard comes last.
    /// A multi wildcard only applies while a slash is left to consume.
    pub fn find<'p>(&self, path: &'p str, captures: &mut Vec<&'p str>) -> Option<RouteId> {
        if path.is_empty() && self.leaf.is_some() {
            return self.leaf;
        }
        if path == "/" && self.trailing_slash_leaf.is_some() {
            return self.trailing_slash_leaf;
        }

        let rest = path.strip_prefix('/')?;
        let (segment, remainder) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };

        if let Some(child) = self.branches.get(segment) {
            if let Some(route) = child.find(remainder, captures) {
                return Some(route);
            }
        }

        if !segment.is_empty() {
            if let Some(child) = &self.dynamic_branch {
                captures.push(segment);
                if let Some(route) = child.find(remainder, captures) {
                    return Some(route);
                }
                captures.pop();
            }
        }

        let route = self.terminal_leaf?;
        captures.push(rest);
        Some(route)
    }

    /// Number of routes stored at or below this node.
    #[must_use]
    pub fn len(&self) -> usize {
        let here = [self.leaf, self.trailing_slash_leaf, self.terminal_leaf]
            .iter()
            .flatten()
            .count();
        here + self.children().map(Node::len).sum::<usize>()
    }

    /// Returns `true` if no route is stored at or below this node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children().map(Node::node_count).sum::<usize>()
    }

    /// Length of the longest path from this node to a descendant.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children()
            .map(|child| 1 + child.depth())
            .max()
            .unwrap_or(0)
    }

    fn children(&self) -> impl Iterator<Item = &Node> + '_ {
        self.branches
            .values()
            .chain(self.dynamic_branch.as_deref())
    }
}

fn occupy(slot: &mut Option<RouteId>, route: RouteId) -> Result<(), Occupied> {
    match *slot {
        Some(existing) => Err(Occupied(existing)),
        None => {
            *slot = Some(route);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn grow(node: &mut Node, route: RouteId, pattern: &str) -> Result<(), Occupied> {
        node.grow(route, Pattern::parse(pattern).unwrap().segments())
    }

    fn find<'p>(node: &Node, path: &'p str) -> Option<(RouteId, Vec<&'p str>)> {
        let mut captures = Vec::new();
        node.find(path, &mut captures).map(|id| (id, captures))
    }

    #[test]
    fn test_grow_and_find() {
        let mut root = Node::new();
        grow(&mut root, 0, "/a/b").unwrap();
        grow(&mut root, 1, "/a/{x}").unwrap();
        grow(&mut root, 2, "/a/").unwrap();
        grow(&mut root, 3, "/a/{rest...}").unwrap();

        assert_eq!(find(&root, "/a/b"), Some((0, vec![])));
        assert_eq!(find(&root, "/a/c"), Some((1, vec!["c"])));
        assert_eq!(find(&root, "/a/"), Some((2, vec![])));
        assert_eq!(find(&root, "/a/c/d"), Some((3, vec!["c/d"])));
        assert_eq!(find(&root, "/a"), None);
        assert_eq!(find(&root, "/b"), None);
        assert_eq!(find(&root, ""), None);
    }

    #[test]
    fn test_same_node() {
        let mut root = Node::new();
        grow(&mut root, 0, "/a/{x}").unwrap();
        assert_eq!(grow(&mut root, 1, "/a/{y}"), Err(Occupied(0)));
        grow(&mut root, 2, "/a/{x}/").unwrap();
        assert_eq!(grow(&mut root, 3, "/a/{z}/{$}"), Err(Occupied(2)));
        grow(&mut root, 4, "/{all...}").unwrap();
        assert_eq!(grow(&mut root, 5, "/{...}"), Err(Occupied(4)));
    }

    #[test]
    fn test_backtracks_out_of_literal_branch() {
        let mut root = Node::new();
        grow(&mut root, 0, "/a/b/c").unwrap();
        grow(&mut root, 1, "/a/{x}/d").unwrap();

        assert_eq!(find(&root, "/a/b/c"), Some((0, vec![])));
        assert_eq!(find(&root, "/a/b/d"), Some((1, vec!["b"])));
        assert_eq!(find(&root, "/a/b/e"), None);
    }

    #[test]
    fn test_captures_pop_on_dead_end() {
        let mut root = Node::new();
        grow(&mut root, 0, "/{x}/{y}/z").unwrap();
        grow(&mut root, 1, "/{x}/{rest...}").unwrap();

        assert_eq!(find(&root, "/a/b/z"), Some((0, vec!["a", "b"])));
        assert_eq!(find(&root, "/a/b/q"), Some((1, vec!["a", "b/q"])));
    }

    #[test]
    fn test_empty_segment_never_binds_wildcard() {
        let mut root = Node::new();
        grow(&mut root, 0, "/a/{x}").unwrap();
        assert_eq!(find(&root, "/a/"), None);
        assert_eq!(find(&root, "/a//"), None);
    }

    #[test]
    fn test_root_trailing_slash() {
        let mut root = Node::new();
        grow(&mut root, 0, "/").unwrap();
        assert_eq!(find(&root, "/"), Some((0, vec![])));
        assert_eq!(find(&root, "/x"), None);
    }

    #[test]
    fn test_stats() {
        let mut root = Node::new();
        assert!(root.is_empty());
        grow(&mut root, 0, "/a/b/c").unwrap();
        grow(&mut root, 1, "/a/{x}").unwrap();
        grow(&mut root, 2, "/a/").unwrap();

        assert_eq!(root.len(), 3);
        // root, a, b, c, {x}
        assert_eq!(root.node_count(), 5);
        assert_eq!(root.depth(), 3);
    }
}
