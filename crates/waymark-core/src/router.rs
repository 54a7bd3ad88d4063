//! Route registration and lookup.
//!
//! Routes are registered on a [`RouterBuilder`], which checks every new
//! pattern against all earlier ones and refuses ambiguous sets. A successful
//! [`RouterBuilder::build`] freezes the trie into a [`Router`] that is never
//! mutated again and can be shared across threads for lookups.

use crate::node::{Node, RouteId};
use crate::pattern::{ParseError, Pattern};
use crate::relation::{classify, common_path, difference_path, Relationship};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Router errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The pattern string could not be parsed.
    #[error("Route {name}: {source}")]
    Parse {
        /// Route name.
        name: String,
        /// Underlying parse error.
        #[source]
        source: ParseError,
    },

    /// A route with this name was already registered.
    #[error("Duplicate route name: {0}")]
    DuplicateName(String),

    /// Two routes match exactly the same paths.
    #[error(
        "Routes {existing} ({existing_pattern}) and {name} ({pattern}) match the same paths, \
         like {witness:?}"
    )]
    Equivalent {
        /// The route being registered.
        name: String,
        /// Its pattern.
        pattern: String,
        /// The route it conflicts with.
        existing: String,
        /// That route's pattern.
        existing_pattern: String,
        /// A path matched by both.
        witness: String,
    },

    /// Two routes share some paths but neither is more specific.
    #[error(
        "Routes {existing} ({existing_pattern}) and {name} ({pattern}) both match some paths, \
         like {witness:?}, but neither is more specific: {name} matches {only_new:?} but \
         {existing} doesn't, and {existing} matches {only_existing:?} but {name} doesn't"
    )]
    Overlapping {
        /// The route being registered.
        name: String,
        /// Its pattern.
        pattern: String,
        /// The route it conflicts with.
        existing: String,
        /// That route's pattern.
        existing_pattern: String,
        /// A path matched by both.
        witness: String,
        /// A path matched only by the new route.
        only_new: String,
        /// A path matched only by the existing route.
        only_existing: String,
    },

    /// Two routes ended on the same trie slot.
    #[error("Routes {existing} and {name} resolve to the same node")]
    SameNode {
        /// The route being registered.
        name: String,
        /// The route already holding the slot.
        existing: String,
    },

    /// More than one registration failed.
    #[error("{} route registrations failed: {}", .0.len(), join_errors(.0))]
    Batch(Vec<RouterError>),
}

fn join_errors(errors: &[RouterError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A registered route.
#[derive(Debug)]
pub struct Route<T> {
    name: String,
    pattern: Pattern,
    action: T,
}

impl<T> Route<T> {
    /// Route name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parsed pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The caller-supplied action.
    #[must_use]
    pub fn action(&self) -> &T {
        &self.action
    }
}

/// Collects routes and checks them for conflicts.
///
/// Errors are returned from [`register`](Self::register) and also remembered,
/// so [`build`](Self::build) fails even if the caller ignored them.
#[derive(Debug)]
pub struct RouterBuilder<T> {
    root: Node,
    routes: Vec<Route<T>>,
    names: HashMap<String, RouteId>,
    errors: Vec<RouterError>,
}

impl<T> RouterBuilder<T> {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::new(),
            routes: Vec::new(),
            names: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Register a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken, the pattern does not parse, or
    /// the pattern is equivalent to or overlaps an earlier route.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        pattern: &str,
        action: T,
    ) -> Result<RouteId, RouterError> {
        let name = name.into();
        self.try_register(name, pattern, action).map_err(|e| {
            warn!(error = %e, "Route registration failed");
            self.errors.push(e.clone());
            e
        })
    }

    /// Register a route, consuming and returning the builder.
    ///
    /// Failures are remembered and reported by [`build`](Self::build).
    #[must_use]
    pub fn route(mut self, name: impl Into<String>, pattern: &str, action: T) -> Self {
        let _ = self.register(name, pattern, action);
        self
    }

    fn try_register(&mut self, name: String, pattern: &str, action: T) -> Result<RouteId, RouterError> {
        if self.names.contains_key(&name) {
            return Err(RouterError::DuplicateName(name));
        }

        let pattern = Pattern::parse(pattern)
            .map_err(|source| RouterError::Parse {
                name: name.clone(),
                source,
            })?
            .with_name(name.clone());

        for existing in &self.routes {
            check_conflict(&name, &pattern, existing)?;
        }

        let id = self.routes.len();
        self.root
            .grow(id, pattern.segments())
            .map_err(|occupied| RouterError::SameNode {
                name: name.clone(),
                existing: self.routes[occupied.0].name.clone(),
            })?;

        debug!(route = %name, pattern = %pattern, "Registered route");
        self.names.insert(name.clone(), id);
        self.routes.push(Route {
            name,
            pattern,
            action,
        });
        Ok(id)
    }

    /// Number of successfully registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no route has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the routes into an immutable router.
    ///
    /// # Errors
    ///
    /// Returns the registration error, or a [`RouterError::Batch`] if there
    /// were several.
    pub fn build(mut self) -> Result<Router<T>, RouterError> {
        match self.errors.len() {
            0 => {}
            1 => return Err(self.errors.remove(0)),
            _ => return Err(RouterError::Batch(self.errors)),
        }

        let router = Router {
            root: self.root,
            routes: self.routes,
            names: self.names,
        };
        let stats = router.stats();
        info!(
            routes = stats.route_count,
            nodes = stats.node_count,
            depth = stats.max_depth,
            "Router built"
        );
        Ok(router)
    }
}

impl<T> Default for RouterBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_conflict<T>(name: &str, pattern: &Pattern, existing: &Route<T>) -> Result<(), RouterError> {
    let other = &existing.pattern;
    match classify(pattern, other) {
        Relationship::Equivalent => Err(RouterError::Equivalent {
            name: name.to_string(),
            pattern: pattern.to_string(),
            existing: existing.name.clone(),
            existing_pattern: other.to_string(),
            witness: common_path(pattern, other),
        }),
        Relationship::Overlaps => Err(RouterError::Overlapping {
            name: name.to_string(),
            pattern: pattern.to_string(),
            existing: existing.name.clone(),
            existing_pattern: other.to_string(),
            witness: common_path(pattern, other),
            only_new: difference_path(pattern, other),
            only_existing: difference_path(other, pattern),
        }),
        relation => {
            trace!(route = %name, other = %existing.name, %relation, "No conflict");
            Ok(())
        }
    }
}

/// An immutable set of routes compiled into a trie.
#[derive(Debug)]
pub struct Router<T> {
    root: Node,
    routes: Vec<Route<T>>,
    names: HashMap<String, RouteId>,
}

impl<T> Router<T> {
    /// Start building a router.
    #[must_use]
    pub fn builder() -> RouterBuilder<T> {
        RouterBuilder::new()
    }

    /// Find the route matching `path`.
    ///
    /// Returns `None` when nothing matches.
    #[must_use]
    pub fn at<'a>(&'a self, path: &'a str) -> Option<Match<'a, T>> {
        let mut values = Vec::new();
        let Some(id) = self.root.find(path, &mut values) else {
            trace!(path = %path, "No route matched");
            return None;
        };

        let route = &self.routes[id];
        trace!(path = %path, route = %route.name, "Matched route");
        let captures = route
            .pattern
            .wildcard_names()
            .zip(values)
            .collect();
        Some(Match {
            route,
            captures: Captures(captures),
        })
    }

    /// Look up a route by name.
    #[must_use]
    pub fn route(&self, name: &str) -> Option<&Route<T>> {
        self.names.get(name).map(|&id| &self.routes[id])
    }

    /// All routes, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route<T>> + '_ {
        self.routes.iter()
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the router has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Get router statistics.
    #[must_use]
    pub fn stats(&self) -> RouterStats {
        RouterStats {
            route_count: self.routes.len(),
            node_count: self.root.node_count(),
            max_depth: self.root.depth(),
        }
    }
}

/// Router statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterStats {
    /// Number of registered routes.
    pub route_count: usize,
    /// Number of trie nodes.
    pub node_count: usize,
    /// Longest chain of trie nodes below the root.
    pub max_depth: usize,
}

/// A successful lookup.
#[derive(Debug)]
pub struct Match<'a, T> {
    route: &'a Route<T>,
    captures: Captures<'a>,
}

impl<'a, T> Match<'a, T> {
    /// The matched route.
    #[must_use]
    pub fn route(&self) -> &'a Route<T> {
        self.route
    }

    /// The matched route's action.
    #[must_use]
    pub fn action(&self) -> &'a T {
        &self.route.action
    }

    /// Values bound by the route's wildcards.
    #[must_use]
    pub fn captures(&self) -> &Captures<'a> {
        &self.captures
    }

    /// Take the captured values.
    #[must_use]
    pub fn into_captures(self) -> Captures<'a> {
        self.captures
    }
}

/// Wildcard values in declaration order.
///
/// Anonymous `{...}` wildcards have no name but still contribute a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures<'a>(Vec<(Option<&'a str>, &'a str)>);

impl<'a> Captures<'a> {
    /// Value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.0
            .iter()
            .find(|(n, _)| *n == Some(name))
            .map(|&(_, value)| value)
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&'a str>, &'a str)> + '_ {
        self.0.iter().copied()
    }

    /// Values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.0.iter().map(|&(_, value)| value)
    }

    /// Number of captured values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Captures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={:?}", name.unwrap_or("..."), value)?;
        }
        Ok(())
    }
}
