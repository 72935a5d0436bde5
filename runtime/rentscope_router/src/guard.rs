use std::borrow::Cow;
use std::sync::Arc;

use rentscope_i18n::{APP_NAME, LocaleController};
use rentscope_session::Session;

use crate::{Navigator, RouteTable, login_redirect};

/// The title key used for locations that match no route.
pub const NOT_FOUND_TITLE_KEY: &str = "notFound";

/// Where an allowed transition lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A declared route.
    Route {
        name: Cow<'static, str>,
        params: Vec<(String, String)>,
    },
    /// No route matched: the not-found view is rendered.
    NotFound,
}

/// The outcome of a route transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed(Destination),
    /// The target requires authentication and there is no session.
    Denied { redirect: String },
}

/// Access control for route transitions.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    routes: Arc<RouteTable>,
    session: Session,
    locale: Arc<LocaleController>,
}

impl NavigationGuard {
    pub fn new(routes: Arc<RouteTable>, session: Session, locale: Arc<LocaleController>) -> Self {
        Self {
            routes,
            session,
            locale,
        }
    }

    /// Evaluate a transition to `full_path` (query string included).
    ///
    /// The document title is set to the target's translated title before the
    /// access check, so a denied transition still updates it.
    /// Locations that match no route are always allowed, without checking the session.
    pub async fn evaluate(&self, full_path: &str) -> Result<Verdict, errors::GuardError> {
        let Some(matched) = self.routes.at(full_path) else {
            self.set_title(Some(NOT_FOUND_TITLE_KEY));
            tracing::debug!(full_path, "No route matched");
            return Ok(Verdict::Allowed(Destination::NotFound));
        };
        self.set_title(matched.route.title_key.as_deref());

        if matched.route.requires_auth && !self.session.is_authenticated().await? {
            let redirect = login_redirect(full_path);
            tracing::debug!(full_path, %redirect, "Denied: authentication required");
            return Ok(Verdict::Denied { redirect });
        }
        Ok(Verdict::Allowed(Destination::Route {
            name: matched.route.name.clone(),
            params: matched.params,
        }))
    }

    /// Evaluate a transition to `full_path` and commit its outcome to `navigator`.
    ///
    /// Denied transitions land on the login route instead.
    pub async fn navigate(
        &self,
        navigator: &dyn Navigator,
        full_path: &str,
    ) -> Result<Verdict, errors::GuardError> {
        let verdict = self.evaluate(full_path).await?;
        match &verdict {
            Verdict::Allowed(_) => navigator.navigate(full_path),
            Verdict::Denied { redirect } => {
                let title_key = self
                    .routes
                    .at(redirect)
                    .and_then(|m| m.route.title_key.clone());
                self.set_title(title_key.as_deref());
                navigator.navigate(redirect);
            }
        }
        Ok(verdict)
    }

    fn set_title(&self, title_key: Option<&str>) {
        let title = title_key
            .and_then(|key| self.locale.translate(key))
            .unwrap_or_else(|| APP_NAME.to_owned());
        self.locale.document().set_title(&title);
    }
}

pub mod errors {
    use rentscope_session::errors::LoadError;

    #[non_exhaustive]
    #[derive(Debug, thiserror::Error)]
    pub enum GuardError {
        #[error("Failed to load the session")]
        Session(#[from] LoadError),
    }
}
