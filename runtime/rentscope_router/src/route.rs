use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use crate::route_path;

/// A route declaration.
///
/// Children inherit the authentication requirement of every ancestor.
/// A child path that doesn't start with `/` is relative to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: Cow<'static, str>,
    pub name: Cow<'static, str>,
    pub requires_auth: bool,
    pub title_key: Option<Cow<'static, str>>,
    pub children: Vec<Route>,
}

impl Route {
    /// A public route, with no title and no children.
    pub fn new(path: impl Into<Cow<'static, str>>, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            requires_auth: false,
            title_key: None,
            children: Vec::new(),
        }
    }

    /// Only logged in users may visit this route or any of its children.
    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// The translation key for the document title.
    pub fn title_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.title_key = Some(key.into());
        self
    }

    pub fn child(mut self, child: Route) -> Self {
        self.children.push(child);
        self
    }
}

/// The routes of the Rentscope web client.
pub fn application_routes() -> Vec<Route> {
    vec![
        Route::new("/", "Home").title_key("nav.home"),
        Route::new("/task-list", "TaskList")
            .title_key("nav.taskList")
            .requires_auth(),
        Route::new("/ip-management", "IpManagement")
            .title_key("menu.ipManagement")
            .requires_auth(),
        Route::new("/scheduled-tasks", "ScheduledTasks")
            .title_key("nav.scheduledTasks")
            .requires_auth(),
        Route::new("/tasks/{task_id}/houses", "HouseList")
            .title_key("nav.houseList")
            .requires_auth(),
        Route::new("/house-list", "houseList")
            .title_key("nav.houseList")
            .requires_auth(),
        Route::new("/analysis", "Analysis")
            .title_key("nav.analysis")
            .requires_auth(),
        Route::new("/login", "Login").title_key("auth.login"),
        Route::new("/register", "Register").title_key("auth.register"),
        Route::new("/forgot-password", "ForgotPassword").title_key("auth.forgotPassword"),
        Route::new("/user/profile", "UserProfile")
            .title_key("user.profile")
            .requires_auth(),
        Route::new("/user/settings", "UserSettings")
            .title_key("user.settings")
            .requires_auth(),
        Route::new("/settings", "SystemSettings")
            .title_key("menu.settings")
            .requires_auth(),
    ]
}

/// A route, flattened: its full path and the properties it inherits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub path: String,
    pub name: Cow<'static, str>,
    /// `true` if this route or any of its ancestors requires authentication.
    pub requires_auth: bool,
    pub title_key: Option<Cow<'static, str>>,
    /// The names of the matched routes, outermost first.
    pub matched: Vec<Cow<'static, str>>,
}

/// The outcome of a successful route lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a ResolvedRoute,
    /// Percent-decoded route parameters, in the order they appear in the path.
    pub params: Vec<(String, String)>,
}

impl RouteMatch<'_> {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A lookup table over a set of [`Route`]s.
#[derive(Debug, Clone)]
pub struct RouteTable {
    router: matchit::Router<usize>,
    routes: Vec<ResolvedRoute>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Result<Self, errors::RouteTableError> {
        let mut resolved = Vec::new();
        for route in &routes {
            flatten(route, "", false, &[], &mut resolved);
        }
        let mut router = matchit::Router::new();
        for (i, route) in resolved.iter().enumerate() {
            router
                .insert(route.path.clone(), i)
                .map_err(|e| errors::RouteTableError {
                    path: route.path.clone(),
                    source: e,
                })?;
        }
        Ok(Self {
            router,
            routes: resolved,
        })
    }

    /// The table for [`application_routes`].
    pub fn application() -> Result<Self, errors::RouteTableError> {
        Self::new(application_routes())
    }

    /// Every route in the table, in declaration order (parents before children).
    pub fn routes(&self) -> &[ResolvedRoute] {
        &self.routes
    }

    /// Match a location against the table.
    ///
    /// Query string and fragment are ignored. Matching is not strict: a trailing
    /// `/` is dropped and ASCII letter case is ignored, while param values keep
    /// the case they were written with.
    pub fn at(&self, location: &str) -> Option<RouteMatch<'_>> {
        let path = normalize(location);
        let folded = path.to_ascii_lowercase();
        let matched = self.router.at(&folded).ok()?;
        let params = matched
            .params
            .iter()
            .map(|(k, v)| {
                let raw = unfold(path, &folded, v);
                (
                    k.to_owned(),
                    percent_decode_str(raw).decode_utf8_lossy().into_owned(),
                )
            })
            .collect();
        Some(RouteMatch {
            route: &self.routes[*matched.value],
            params,
        })
    }
}

fn normalize(location: &str) -> &str {
    let path = route_path(location);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Map a slice of `folded` back onto `original`.
///
/// ASCII case folding preserves byte offsets.
fn unfold<'a>(original: &'a str, folded: &str, slice: &'a str) -> &'a str {
    (slice.as_ptr() as usize)
        .checked_sub(folded.as_ptr() as usize)
        .and_then(|start| original.get(start..start.checked_add(slice.len())?))
        .unwrap_or(slice)
}

fn flatten(
    route: &Route,
    parent_path: &str,
    parent_requires_auth: bool,
    ancestors: &[Cow<'static, str>],
    out: &mut Vec<ResolvedRoute>,
) {
    let path = if route.path.starts_with('/') || parent_path.is_empty() {
        route.path.to_string()
    } else {
        format!("{}/{}", parent_path.trim_end_matches('/'), route.path)
    };
    let requires_auth = parent_requires_auth || route.requires_auth;
    let mut matched = ancestors.to_vec();
    matched.push(route.name.clone());
    out.push(ResolvedRoute {
        path: path.clone(),
        name: route.name.clone(),
        requires_auth,
        title_key: route.title_key.clone(),
        matched: matched.clone(),
    });
    for child in &route.children {
        flatten(child, &path, requires_auth, &matched, out);
    }
}

pub mod errors {
    #[derive(Debug, thiserror::Error)]
    #[error("`{path}` cannot be added to the route table")]
    pub struct RouteTableError {
        pub path: String,
        #[source]
        pub source: matchit::InsertError,
    }
}
