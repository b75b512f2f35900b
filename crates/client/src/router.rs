//! Route table with ordered guard chains.
//!
//! Routes are matched in declaration order, first match wins. A matched view
//! route runs its guards in declared order and stops at the first `false`;
//! that guard has already redirected.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use storefront_auth::{Decision, LOGIN_PATH, RouteGuard, Session, evaluate_in_order};

use crate::guards::{AdminGuard, AuthGuard, CanActivate};
use crate::navigation::Navigator;
use crate::session_store::SessionStore;

/// Views of the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Login,
    Register,
    Products,
    ProductDetail,
    Inventory,
    InventoryDetail,
    Orders,
    OrderDetail,
    Users,
    UserDetail,
    Reports,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Activation {
    Granted {
        view: View,
        params: BTreeMap<String, String>,
    },
    /// A guard refused; it has already navigated to its redirect target.
    Denied { guard: &'static str },
    /// The path is an alias for another one.
    Redirect { to: &'static str },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Param(&'static str),
    /// `**`: matches any path.
    Wildcard,
}

enum Target {
    View {
        view: View,
        guards: Vec<Arc<dyn CanActivate>>,
    },
    Redirect(&'static str),
}

struct Route {
    pattern: &'static str,
    segments: Vec<Segment>,
    target: Target,
}

impl Route {
    fn matches(&self, path: &[&str]) -> Option<BTreeMap<String, String>> {
        if self.segments == [Segment::Wildcard] {
            return Some(BTreeMap::new());
        }
        if self.segments.len() != path.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Param(name) => {
                    params.insert(name.to_string(), part.to_string());
                }
                _ => return None,
            }
        }
        Some(params)
    }
}

fn parse_pattern(pattern: &'static str) -> Vec<Segment> {
    split_path(pattern)
        .into_iter()
        .map(|part| match part {
            "**" => Segment::Wildcard,
            p if p.starts_with(':') => Segment::Param(&p[1..]),
            p => Segment::Literal(p),
        })
        .collect()
}

fn split_path(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

pub struct Router {
    routes: Vec<Route>,
    store: SessionStore,
}

impl Router {
    pub fn new(store: SessionStore) -> Self {
        Self {
            routes: Vec::new(),
            store,
        }
    }

    /// Declare a view route guarded by `guards`, evaluated in the given order.
    pub fn route(mut self, pattern: &'static str, view: View, guards: Vec<Arc<dyn CanActivate>>) -> Self {
        self.routes.push(Route {
            pattern,
            segments: parse_pattern(pattern),
            target: Target::View { view, guards },
        });
        self
    }

    pub fn redirect(mut self, pattern: &'static str, to: &'static str) -> Self {
        self.routes.push(Route {
            pattern,
            segments: parse_pattern(pattern),
            target: Target::Redirect(to),
        });
        self
    }

    /// The admin console's route table.
    ///
    /// Admin-only views declare the authentication guard first so an
    /// unauthenticated user is turned away for the right reason.
    pub fn admin_console(store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        let auth: Arc<dyn CanActivate> =
            Arc::new(AuthGuard::authenticated(store.clone(), navigator.clone()));
        let admin: Arc<dyn CanActivate> = Arc::new(AdminGuard::admin(store.clone(), navigator));

        let signed_in = || vec![auth.clone()];
        let admin_only = || vec![auth.clone(), admin.clone()];

        Router::new(store)
            .route("login", View::Login, vec![])
            .route("register", View::Register, vec![])
            .route("products", View::Products, signed_in())
            .route("products/:id", View::ProductDetail, signed_in())
            .route("inventory", View::Inventory, admin_only())
            .route("inventory/:id", View::InventoryDetail, admin_only())
            .route("orders", View::Orders, signed_in())
            .route("orders/:id", View::OrderDetail, signed_in())
            .route("users", View::Users, admin_only())
            .route("users/:id", View::UserDetail, admin_only())
            .route("reports", View::Reports, admin_only())
            .redirect("", LOGIN_PATH)
            .redirect("**", LOGIN_PATH)
    }

    /// Attempt to activate the view at `path`, running its guards.
    pub fn activate(&self, path: &str) -> Activation {
        let parts = split_path(path);

        let Some((route, params)) = self
            .routes
            .iter()
            .find_map(|route| route.matches(&parts).map(|params| (route, params)))
        else {
            tracing::debug!(path, "no route matched");
            return Activation::NotFound;
        };

        match &route.target {
            Target::Redirect(to) => Activation::Redirect { to: *to },
            Target::View { view, guards } => {
                for guard in guards {
                    if !guard.can_activate() {
                        return Activation::Denied {
                            guard: guard.policy().name(),
                        };
                    }
                }
                tracing::debug!(path, pattern = route.pattern, ?view, "route activated");
                Activation::Granted {
                    view: *view,
                    params,
                }
            }
        }
    }

    /// Patterns of the view routes the current session may open.
    ///
    /// Evaluates policies only: no redirect is issued.
    pub fn accessible(&self) -> Vec<&'static str> {
        let session = self.store.get();
        self.routes
            .iter()
            .filter(|route| Self::allows(route, &session))
            .map(|route| route.pattern)
            .collect()
    }

    fn allows(route: &Route, session: &Session) -> bool {
        match &route.target {
            Target::Redirect(_) => false,
            Target::View { guards, .. } => {
                let policies = guards.iter().map(|g| g.policy() as &dyn RouteGuard);
                matches!(evaluate_in_order(policies, session), Decision::Allow)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    use crate::navigation::HistoryNavigator;
    use crate::storage::MemoryTokenStorage;

    fn token_with_role(role: &str) -> String {
        let payload = base64::engine::general_purpose::STANDARD
            .encode(serde_json::json!({ "role": role }).to_string());
        format!("header.{payload}.sig")
    }

    fn console(stored: Option<String>) -> (Router, SessionStore, Arc<HistoryNavigator>) {
        let storage = match stored {
            Some(token) => MemoryTokenStorage::with_token(token),
            None => MemoryTokenStorage::new(),
        };
        let store = SessionStore::init(Arc::new(storage));
        let nav = Arc::new(HistoryNavigator::new());
        (
            Router::admin_console(store.clone(), nav.clone()),
            store,
            nav,
        )
    }

    #[test]
    fn public_routes_need_no_session() {
        let (router, _, nav) = console(None);
        assert!(matches!(
            router.activate("/login"),
            Activation::Granted { view: View::Login, .. }
        ));
        assert!(matches!(
            router.activate("register"),
            Activation::Granted { view: View::Register, .. }
        ));
        assert!(nav.history().is_empty());
    }

    #[test]
    fn unauthenticated_admin_route_is_denied_by_auth_guard_first() {
        let (router, _, nav) = console(None);

        assert_eq!(router.activate("/users"), Activation::Denied { guard: "auth" });
        // Short-circuit: only one redirect was issued.
        assert_eq!(nav.history(), vec![LOGIN_PATH]);
    }

    #[test]
    fn user_token_reaches_products_but_not_reports() {
        let (router, _, nav) = console(Some(token_with_role("USER")));

        let Activation::Granted { view, params } = router.activate("/products/42") else {
            panic!("expected product detail");
        };
        assert_eq!(view, View::ProductDetail);
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert!(nav.history().is_empty());

        assert_eq!(router.activate("/reports"), Activation::Denied { guard: "admin" });
        assert_eq!(nav.history(), vec![LOGIN_PATH]);
    }

    #[test]
    fn garbage_token_passes_auth_but_not_admin() {
        let (router, _, _) = console(Some("garbage".into()));
        assert!(matches!(router.activate("/orders"), Activation::Granted { .. }));
        assert_eq!(router.activate("/inventory/7"), Activation::Denied { guard: "admin" });
    }

    #[test]
    fn admin_token_opens_everything() {
        let (router, _, nav) = console(Some(token_with_role("ADMIN")));
        for path in ["/inventory", "/inventory/1", "/users", "/users/9", "/reports", "/orders/3"] {
            assert!(
                matches!(router.activate(path), Activation::Granted { .. }),
                "{path} should be granted"
            );
        }
        assert!(nav.history().is_empty());
    }

    #[test]
    fn empty_and_unknown_paths_redirect_to_login() {
        let (router, _, _) = console(None);
        assert_eq!(router.activate(""), Activation::Redirect { to: LOGIN_PATH });
        assert_eq!(router.activate("/"), Activation::Redirect { to: LOGIN_PATH });
        assert_eq!(router.activate("/nope/deeper"), Activation::Redirect { to: LOGIN_PATH });
    }

    #[test]
    fn query_strings_are_ignored_for_matching() {
        let (router, _, _) = console(Some(token_with_role("USER")));
        assert!(matches!(
            router.activate("/products?name=lamp#top"),
            Activation::Granted { view: View::Products, .. }
        ));
    }

    #[test]
    fn not_found_without_wildcard() {
        let store = SessionStore::init(Arc::new(MemoryTokenStorage::new()));
        let router = Router::new(store).route("login", View::Login, vec![]);
        assert_eq!(router.activate("/elsewhere"), Activation::NotFound);
    }

    #[test]
    fn accessible_follows_the_session_without_side_effects() {
        let (router, store, nav) = console(None);
        assert_eq!(router.accessible(), vec!["login", "register"]);

        store.set(Session::from_token(token_with_role("USER")));
        assert_eq!(
            router.accessible(),
            vec!["login", "register", "products", "products/:id", "orders", "orders/:id"]
        );

        store.set(Session::from_token(token_with_role("ADMIN")));
        assert_eq!(router.accessible().len(), 11);
        assert!(nav.history().is_empty());
    }
}
