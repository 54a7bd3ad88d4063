//! # waymark-core
//!
//! Pattern-based path routing for the Waymark HTTP router.
//!
//! This crate provides the building blocks:
//!
//! - **Pattern** - Parsed route templates (`/users/{id}/files/{path...}`)
//! - **Relationship** - Pairwise pattern comparison used to reject ambiguous routes
//! - **Node** - The routing trie
//! - **Router** - Build-once, read-many route lookup
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Pattern   │────▶│   Builder   │────▶│   Router    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │ Relationship│     │    Trie     │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use waymark_core::Router;
//!
//! let router = Router::builder()
//!     .route("repo", "/repos/{owner}/{repo}", "show_repo")
//!     .route("file", "/repos/{owner}/{repo}/blob/{path...}", "show_file")
//!     .build()
//!     .unwrap();
//!
//! let m = router.at("/repos/tenvisio/waymark/blob/src/lib.rs").unwrap();
//! assert_eq!(*m.action(), "show_file");
//! assert_eq!(m.captures().get("path"), Some("src/lib.rs"));
//! ```

pub mod branches;
pub mod node;
pub mod pattern;
pub mod relation;
pub mod router;

pub use branches::Branches;
pub use node::{Node, RouteId};
pub use pattern::{ParseError, Pattern, Segment};
pub use relation::{classify, common_path, difference_path, Relationship};
pub use router::{Captures, Match, Route, Router, RouterBuilder, RouterError, RouterStats};
