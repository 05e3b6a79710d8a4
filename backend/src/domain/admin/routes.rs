//! Statically constructed admin route table.

use super::handlers::{self, HandlerContext, HandlerFuture};
use super::request::Method;

/// Type-erased handler stored in a [`Route`].
pub type Handler = for<'a> fn(HandlerContext<'a>) -> HandlerFuture<'a>;

macro_rules! boxed_handlers {
    ($($name:ident => $handler:path),* $(,)?) => {
        $(
            fn $name(ctx: HandlerContext<'_>) -> HandlerFuture<'_> {
                Box::pin($handler(ctx))
            }
        )*
    };
}

boxed_handlers! {
    info => handlers::get_info,
    model_analysis => handlers::get_model_analysis,
    request_analysis => handlers::get_request_analysis,
    billing_analysis => handlers::get_billing_analysis,
    error_analysis => handlers::get_error_analysis,
    invitation_list => handlers::list_invitations,
    invitation_generate => handlers::generate_invitations,
    user_list => handlers::list_users,
}

/// One `(method, path, operation id, handler)` entry.
#[derive(Clone)]
pub struct Route {
    method: Method,
    path: &'static str,
    operation_id: &'static str,
    handler: Handler,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn operation_id(&self) -> &'static str {
        self.operation_id
    }

    pub(crate) fn handler(&self) -> Handler {
        self.handler
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("operation_id", &self.operation_id)
            .finish_non_exhaustive()
    }
}

/// Result of matching a request against the table.
#[derive(Debug)]
pub enum RouteMatch<'a> {
    Found(&'a Route),
    /// The path exists but only for the listed methods.
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
    NotFound,
}

/// Exact-match routing over method and path.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// The eight admin operations.
    ///
    /// # Examples
    /// ```
    /// use admin_gateway::domain::admin::{Method, RouteMatch, RouteTable};
    ///
    /// let table = RouteTable::admin();
    /// assert_eq!(table.routes().len(), 8);
    /// assert!(matches!(
    ///     table.lookup(&Method::Post, "/admin/user/list"),
    ///     RouteMatch::MethodNotAllowed { .. }
    /// ));
    /// ```
    pub fn admin() -> Self {
        let route = |method, path, operation_id, handler: Handler| Route {
            method,
            path,
            operation_id,
            handler,
        };
        Self {
            routes: vec![
                route(Method::Get, "/admin/analytics/info", "getInfo", info),
                route(Method::Get, "/admin/analytics/model", "getModelAnalysis", model_analysis),
                route(Method::Get, "/admin/analytics/request", "getRequestAnalysis", request_analysis),
                route(Method::Get, "/admin/analytics/billing", "getBillingAnalysis", billing_analysis),
                route(Method::Get, "/admin/analytics/error", "getErrorAnalysis", error_analysis),
                route(Method::Get, "/admin/invitation/list", "listInvitations", invitation_list),
                route(Method::Post, "/admin/invitation/generate", "generateInvitations", invitation_generate),
                route(Method::Get, "/admin/user/list", "listUsers", user_list),
            ],
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Match `method` and `path` exactly.
    pub fn lookup(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let mut allowed = Vec::new();
        for route in self.routes.iter().filter(|route| route.path == path) {
            if &route.method == method {
                return RouteMatch::Found(route);
            }
            allowed.push(route.method.clone());
        }
        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed { allowed }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::collections::HashSet;

    #[fixture]
    fn table() -> RouteTable {
        RouteTable::admin()
    }

    #[rstest]
    #[case(Method::Get, "/admin/analytics/info", "getInfo")]
    #[case(Method::Get, "/admin/analytics/model", "getModelAnalysis")]
    #[case(Method::Get, "/admin/analytics/request", "getRequestAnalysis")]
    #[case(Method::Get, "/admin/analytics/billing", "getBillingAnalysis")]
    #[case(Method::Get, "/admin/analytics/error", "getErrorAnalysis")]
    #[case(Method::Get, "/admin/invitation/list", "listInvitations")]
    #[case(Method::Post, "/admin/invitation/generate", "generateInvitations")]
    #[case(Method::Get, "/admin/user/list", "listUsers")]
    fn every_operation_is_routed(
        table: RouteTable,
        #[case] method: Method,
        #[case] path: &str,
        #[case] operation_id: &str,
    ) {
        match table.lookup(&method, path) {
            RouteMatch::Found(route) => assert_eq!(route.operation_id(), operation_id),
            other => panic!("expected {operation_id}, got {other:?}"),
        }
    }

    #[rstest]
    fn wrong_method_reports_allowed_methods(table: RouteTable) {
        match table.lookup(&Method::Get, "/admin/invitation/generate") {
            RouteMatch::MethodNotAllowed { allowed } => assert_eq!(allowed, vec![Method::Post]),
            other => panic!("expected method not allowed, got {other:?}"),
        }
    }

    #[rstest]
    #[case("/admin/analytics")]
    #[case("/admin/analytics/info/extra")]
    #[case("/admin/Analytics/info")]
    #[case("/admin/user")]
    fn unknown_paths_are_not_found(table: RouteTable, #[case] path: &str) {
        assert!(matches!(table.lookup(&Method::Get, path), RouteMatch::NotFound));
    }

    #[rstest]
    fn method_and_path_pairs_are_unique(table: RouteTable) {
        let pairs: HashSet<_> = table
            .routes()
            .iter()
            .map(|route| (route.method().clone(), route.path()))
            .collect();
        assert_eq!(pairs.len(), table.routes().len());
    }
}
