//! Application routes and navigation history.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    CreatePoint,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::CreatePoint => "/points/create",
        }
    }

    /// Home matches "/" exactly; the create page also matches nested paths
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Route::Home),
            p if p == "/points/create" || p.starts_with("/points/create/") => {
                Some(Route::CreatePoint)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    history: Vec<Route>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            history: vec![start],
        }
    }

    pub fn current(&self) -> Route {
        // history always holds the start route
        self.history.last().copied().unwrap_or(Route::Home)
    }

    pub fn navigate(&mut self, route: Route) {
        tracing::debug!("Navigating {} -> {}", self.current(), route);
        self.history.push(route);
    }

    /// Go back one entry; the start route is never popped
    pub fn back(&mut self) -> Route {
        if self.history.len() > 1 {
            self.history.pop();
        }
        self.current()
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }
}
