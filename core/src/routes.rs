//! Client-side route table for the single-page UI.
//!
//! The table is static: no guards, no parameters. Matching ignores any query
//! string or fragment and a single trailing slash.

/// A screen of the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Table browsing.
    Data,
    /// AHP and Python-backed evaluation.
    Evaluation,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Data => "Data",
            View::Evaluation => "Evaluation",
        }
    }

    /// Canonical path of the view.
    pub fn path(&self) -> &'static str {
        match self {
            View::Data => "/data",
            View::Evaluation => "/evaluation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    View(View),
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub target: RouteTarget,
}

pub const ROUTES: &[Route] = &[
    Route {
        path: "/",
        target: RouteTarget::Redirect("/data"),
    },
    Route {
        path: "/data",
        target: RouteTarget::View(View::Data),
    },
    Route {
        path: "/evaluation",
        target: RouteTarget::View(View::Evaluation),
    },
];

const MAX_REDIRECTS: usize = 8;

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// The route entry for `path`, without following redirects.
pub fn find(path: &str) -> Option<&'static Route> {
    let path = normalize(path);
    ROUTES.iter().find(|r| r.path == path)
}

/// Resolves `path` to a view, following redirects. Unknown paths and
/// redirect loops resolve to `None`.
pub fn resolve(path: &str) -> Option<View> {
    resolve_in(ROUTES, path)
}

fn resolve_in(routes: &[Route], path: &str) -> Option<View> {
    let mut current = normalize(path);
    for _ in 0..=MAX_REDIRECTS {
        let route = routes.iter().find(|r| r.path == current)?;
        match route.target {
            RouteTarget::View(view) => return Some(view),
            RouteTarget::Redirect(to) => current = normalize(to),
        }
    }
    None
}
