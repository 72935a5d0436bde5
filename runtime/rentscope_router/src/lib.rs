//! Route-level access control for the Rentscope client runtime.
//!
//! Routes are declared once, in a [`RouteTable`].
//! Every transition goes through the [`NavigationGuard`], which sets the document
//! title and sends anonymous users to the login route when the target requires
//! authentication.
mod guard;
mod navigator;
mod route;

pub use guard::{Destination, NOT_FOUND_TITLE_KEY, NavigationGuard, Verdict};
pub use navigator::{
    InMemoryNavigator, LOGIN_PATH, Navigator, is_login_location, login_redirect, route_path,
};
pub use route::{ResolvedRoute, Route, RouteMatch, RouteTable, application_routes};

pub mod errors {
    //! Errors that can occur when building a route table or guarding a transition.
    pub use crate::guard::errors::*;
    pub use crate::route::errors::*;
}
