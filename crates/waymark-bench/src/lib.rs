//! Shared route tables for the Waymark benchmarks.

use waymark_core::Router;

/// A REST API shaped route table: `(name, pattern)`.
pub const API_ROUTES: &[(&str, &str)] = &[
    ("root", "/"),
    ("user", "/user"),
    ("user_repos", "/user/repos"),
    ("users", "/users"),
    ("user_by_name", "/users/{user}"),
    ("user_repos_by_name", "/users/{user}/repos"),
    ("user_followers", "/users/{user}/followers"),
    ("user_following", "/users/{user}/following"),
    ("user_follows", "/users/{user}/following/{target}"),
    ("org", "/orgs/{org}"),
    ("org_repos", "/orgs/{org}/repos"),
    ("org_members", "/orgs/{org}/members"),
    ("org_member", "/orgs/{org}/members/{user}"),
    ("repo", "/repos/{owner}/{repo}"),
    ("repo_issues", "/repos/{owner}/{repo}/issues"),
    ("repo_issue", "/repos/{owner}/{repo}/issues/{number}"),
    ("repo_issue_comments", "/repos/{owner}/{repo}/issues/{number}/comments"),
    ("repo_pulls", "/repos/{owner}/{repo}/pulls"),
    ("repo_pull", "/repos/{owner}/{repo}/pulls/{number}"),
    ("repo_pull_files", "/repos/{owner}/{repo}/pulls/{number}/files"),
    ("repo_branches", "/repos/{owner}/{repo}/branches"),
    ("repo_branch", "/repos/{owner}/{repo}/branches/{branch}"),
    ("repo_contents", "/repos/{owner}/{repo}/contents/{path...}"),
    ("repo_readme", "/repos/{owner}/{repo}/readme"),
    ("repo_tags", "/repos/{owner}/{repo}/tags"),
    ("repo_releases", "/repos/{owner}/{repo}/releases"),
    ("repo_release_latest", "/repos/{owner}/{repo}/releases/latest"),
    ("repo_release", "/repos/{owner}/{repo}/releases/{id}"),
    ("gists", "/gists"),
    ("gists_public", "/gists/public"),
    ("gist", "/gists/{id}"),
    ("gist_star", "/gists/{id}/star"),
    ("search_repos", "/search/repositories"),
    ("search_code", "/search/code"),
    ("search_users", "/search/users"),
    ("static", "/static/{path...}"),
];

/// Request paths against [`API_ROUTES`], hits and misses mixed.
pub const API_PATHS: &[&str] = &[
    "/",
    "/user/repos",
    "/users/octocat",
    "/users/octocat/following/hubot",
    "/orgs/rust-lang/members/alice",
    "/repos/tenvisio/waymark",
    "/repos/tenvisio/waymark/issues/42/comments",
    "/repos/tenvisio/waymark/releases/latest",
    "/repos/tenvisio/waymark/releases/17",
    "/repos/tenvisio/waymark/contents/crates/waymark-core/src/lib.rs",
    "/gists/public",
    "/gists/abc123/star",
    "/search/code",
    "/static/css/site.css",
    "/repos/tenvisio",
    "/nowhere/at/all",
];

/// Build a router over [`API_ROUTES`]; each action is the route's index.
///
/// # Panics
///
/// Panics if the table is ambiguous.
#[must_use]
pub fn api_router() -> Router<usize> {
    let mut builder = Router::builder();
    for (i, (name, pattern)) in API_ROUTES.iter().enumerate() {
        builder = builder.route(*name, pattern, i);
    }
    builder.build().expect("API route table is valid")
}

/// `n` literal siblings under `/items`, for measuring fan-out.
#[must_use]
pub fn fanout_routes(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|i| (format!("item_{}", i), format!("/items/item{}", i)))
        .collect()
}

/// Build a router over [`fanout_routes`].
///
/// # Panics
///
/// Panics if the generated table fails to build.
#[must_use]
pub fn fanout_router(n: usize) -> Router<usize> {
    let mut builder = Router::builder();
    for (i, (name, pattern)) in fanout_routes(n).into_iter().enumerate() {
        builder = builder.route(name, &pattern, i);
    }
    builder.build().expect("fan-out table is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_router_builds() {
        let router = api_router();
        assert_eq!(router.len(), API_ROUTES.len());
    }

    #[test]
    fn test_api_paths_resolve() {
        let router = api_router();
        let resolve = |path| router.at(path).map(|m| m.route().name().to_string());

        assert_eq!(resolve("/").as_deref(), Some("root"));
        assert_eq!(
            resolve("/repos/tenvisio/waymark/releases/latest").as_deref(),
            Some("repo_release_latest")
        );
        assert_eq!(
            resolve("/repos/tenvisio/waymark/releases/17").as_deref(),
            Some("repo_release")
        );
        assert_eq!(
            resolve("/repos/tenvisio/waymark/contents/crates/waymark-core/src/lib.rs").as_deref(),
            Some("repo_contents")
        );
        assert_eq!(resolve("/repos/tenvisio"), None);
        assert_eq!(resolve("/nowhere/at/all"), None);
    }

    #[test]
    fn test_fanout_router() {
        let router = fanout_router(64);
        assert_eq!(router.len(), 64);
        assert_eq!(*router.at("/items/item63").unwrap().action(), 63);
        assert!(router.at("/items/item64").is_none());
    }
}
