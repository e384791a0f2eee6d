//! URL-to-screen mapping for the management UI.
//!
//! There is exactly one screen: branch management, mounted at `/` below the
//! history base.

/// Screens the UI can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Branches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
}

pub const ROUTES: &[Route] = &[Route {
    path: "/",
    name: "Branches",
    view: View::Branches,
}];

/// Resolves request paths against `ROUTES` under a history base.
#[derive(Debug, Clone)]
pub struct Router {
    base: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Router {
    /// `base` is the prefix the app is served under, e.g. `/admin/`.
    pub fn new(base: &str) -> Self {
        let trimmed = base.trim_matches('/');
        let base = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Self { base }
    }

    /// Route for `location`, ignoring query string, fragment and a trailing
    /// slash. Paths outside the base resolve to `None`.
    pub fn resolve(&self, location: &str) -> Option<&'static Route> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let path = self.strip_base(path)?;
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        ROUTES.iter().find(|r| r.path == path)
    }

    /// Full path of the route called `name`.
    pub fn href(&self, name: &str) -> Option<String> {
        ROUTES
            .iter()
            .find(|r| r.name == name)
            .map(|r| format!("{}{}", self.base, r.path))
    }

    fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.base.is_empty() {
            return Some(path);
        }
        let rest = path.strip_prefix(&self.base)?;
        // `/adminx` must not match base `/admin`.
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}
