use std::fmt;

use axum::{
    middleware::from_fn_with_state,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use serde::Serialize;

use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

/// Checks a request must pass before its handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardChain {
    Public,
    /// Auth gate, then role gate
    Admin,
    /// Auth gate; the handler defers to the self-check guard
    SelfCheck,
}

impl GuardChain {
    pub fn stages(&self) -> &'static [&'static str] {
        match self {
            GuardChain::Public => &[],
            GuardChain::Admin => &["auth", "role"],
            GuardChain::SelfCheck => &["auth", "self-check"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl RouteMethod {
    fn filter(&self) -> MethodFilter {
        match self {
            RouteMethod::Get => MethodFilter::GET,
            RouteMethod::Post => MethodFilter::POST,
            RouteMethod::Patch => MethodFilter::PATCH,
            RouteMethod::Delete => MethodFilter::DELETE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Patch => "PATCH",
            RouteMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation a route dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Banner,
    Health,
    IssueToken,
    RegisterUser,
    ListUsers,
    DeleteUser,
    PromoteUser,
    AdminStatus,
    ListMenu,
    GetMenuItem,
    CreateMenuItem,
    UpdateMenuItem,
    DeleteMenuItem,
    ListReviews,
    ListCartItems,
    AddCartItem,
    DeleteCartItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuardedRoute {
    pub method: RouteMethod,
    pub path: &'static str,
    pub guard: GuardChain,
    pub endpoint: Endpoint,
}

const fn route(method: RouteMethod, path: &'static str, guard: GuardChain, endpoint: Endpoint) -> GuardedRoute {
    GuardedRoute { method, path, guard, endpoint }
}

use Endpoint as E;
use GuardChain::{Admin, Public, SelfCheck};
use RouteMethod::{Delete, Get, Patch, Post};

/// Every route the gateway serves and the guards in front of it.
///
/// The router is built from this table alone. `/users/admin/:user` is an email
/// for GET and a document id for PATCH; both share the parameter name so the
/// two methods live on one path.
pub const ROUTE_TABLE: &[GuardedRoute] = &[
    route(Get, "/", Public, E::Banner),
    route(Get, "/health", Public, E::Health),
    route(Post, "/jwt", Public, E::IssueToken),
    // users
    route(Post, "/users", Public, E::RegisterUser),
    route(Get, "/users", Admin, E::ListUsers),
    route(Delete, "/users/:id", Admin, E::DeleteUser),
    route(Get, "/users/admin/:user", SelfCheck, E::AdminStatus),
    route(Patch, "/users/admin/:user", Admin, E::PromoteUser),
    // menu
    route(Get, "/menu", Public, E::ListMenu),
    route(Post, "/menu", Admin, E::CreateMenuItem),
    route(Get, "/menu/:id", Public, E::GetMenuItem),
    route(Patch, "/menu/:id", Admin, E::UpdateMenuItem),
    route(Delete, "/menu/:id", Admin, E::DeleteMenuItem),
    // reviews and carts
    route(Get, "/reviews", Public, E::ListReviews),
    route(Get, "/carts", Public, E::ListCartItems),
    route(Post, "/carts", Public, E::AddCartItem),
    route(Delete, "/carts/:id", Public, E::DeleteCartItem),
];

/// Routes whose guard chain includes the role gate.
pub fn privileged_routes() -> impl Iterator<Item = &'static GuardedRoute> {
    ROUTE_TABLE.iter().filter(|r| r.guard == GuardChain::Admin)
}

fn endpoint_router(method: RouteMethod, endpoint: Endpoint) -> MethodRouter<AppState> {
    let filter = method.filter();
    match endpoint {
        Endpoint::Banner => on(filter, public::banner),
        Endpoint::Health => on(filter, public::health),
        Endpoint::IssueToken => on(filter, public::issue_token),
        Endpoint::RegisterUser => on(filter, public::register_user),
        Endpoint::ListUsers => on(filter, elevated::list_users),
        Endpoint::DeleteUser => on(filter, elevated::delete_user),
        Endpoint::PromoteUser => on(filter, elevated::promote_user),
        Endpoint::AdminStatus => on(filter, protected::admin_status),
        Endpoint::ListMenu => on(filter, public::list_menu),
        Endpoint::GetMenuItem => on(filter, public::get_menu_item),
        Endpoint::CreateMenuItem => on(filter, elevated::create_menu_item),
        Endpoint::UpdateMenuItem => on(filter, elevated::update_menu_item),
        Endpoint::DeleteMenuItem => on(filter, elevated::delete_menu_item),
        Endpoint::ListReviews => on(filter, public::list_reviews),
        Endpoint::ListCartItems => on(filter, public::list_cart_items),
        Endpoint::AddCartItem => on(filter, public::add_cart_item),
        Endpoint::DeleteCartItem => on(filter, public::delete_cart_item),
    }
}

/// Build the application router from `ROUTE_TABLE`.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new();

    for entry in ROUTE_TABLE {
        let handler = endpoint_router(entry.method, entry.endpoint);

        // route_layer: the last layer added runs first
        let guarded = match entry.guard {
            GuardChain::Public => handler,
            GuardChain::SelfCheck => {
                handler.route_layer(from_fn_with_state(state.auth_gate.clone(), require_auth))
            }
            GuardChain::Admin => handler
                .route_layer(from_fn_with_state(state.role_gate.clone(), require_admin))
                .route_layer(from_fn_with_state(state.auth_gate.clone(), require_auth)),
        };

        router = router.route(entry.path, guarded);
    }

    router.with_state(state)
}
