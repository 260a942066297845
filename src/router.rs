use std::{fmt, sync::Arc};

use http_body_util::Full;
use hyper::{body::Bytes, header::AUTHORIZATION, Response, StatusCode};
use tracing::{debug, error, trace};

use crate::{
    auth,
    handler::{boxed, internal_server_error, BoxedHandler},
    routes, Config, Credentials, FixtureRequest, Handler, DEFAULT_REALM,
};

/// Decides during the auth phase whether a request may reach its route.
pub trait AuthGuard: Send + Sync + 'static {
    fn allows(&self, req: &FixtureRequest) -> bool;
}

impl<F> AuthGuard for F
where
    F: Fn(&FixtureRequest) -> bool + Send + Sync + 'static,
{
    fn allows(&self, req: &FixtureRequest) -> bool {
        self(req)
    }
}

/// Basic authentication against a single username/password pair.
impl AuthGuard for Credentials {
    fn allows(&self, req: &FixtureRequest) -> bool {
        self.verify(req.headers().get(AUTHORIZATION))
    }
}

#[derive(Clone)]
struct Route {
    path: String,
    guard: Option<Arc<dyn AuthGuard>>,
    handler: BoxedHandler,
}

/// An ordered route table. Each request first passes the auth phase, where
/// the guard of its route (if any) is consulted, and is then handed to the
/// route's handler. Paths are matched exactly, without the query string, and
/// the first matching route wins.
#[derive(Clone)]
pub struct Router {
    routes: Vec<Route>,
    realm: String,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field(
                "routes",
                &self.routes.iter().map(|r| &r.path).collect::<Vec<_>>(),
            )
            .field("realm", &self.realm)
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(DEFAULT_REALM)
    }
}

impl Router {
    /// Creates an empty table whose auth challenges name `realm`.
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            routes: Vec::new(),
            realm: realm.into(),
        }
    }

    /// The canned fixture routes, with `/basic_auth.html` guarded by the
    /// configured credentials.
    pub fn fixture(config: &Config) -> Self {
        Self::new(config.realm.clone())
            .route("/hello.html", routes::hello)
            .guarded_route(
                "/basic_auth.html",
                config.credentials.clone(),
                routes::header_reflect,
            )
            .route("/basic.json", routes::basic_json)
            .route("/header_reflect.html", routes::header_reflect)
            .route("/temporary_redirect.html", routes::temporary_redirect)
            .route("/permanent_redirect.html", routes::permanent_redirect)
            .route("/two_redirects.html", routes::two_redirects)
            .route("/url_post.html", routes::url_post)
    }

    /// Adds a route that every request may reach.
    pub fn route<H: Handler>(mut self, path: impl Into<String>, handler: H) -> Self {
        self.routes.push(Route {
            path: path.into(),
            guard: None,
            handler: boxed(handler),
        });
        self
    }

    /// Adds a route that is only reached when `guard` allows the request.
    /// Rejected requests get a `401` Basic challenge.
    pub fn guarded_route<G: AuthGuard, H: Handler>(
        mut self,
        path: impl Into<String>,
        guard: G,
        handler: H,
    ) -> Self {
        self.routes.push(Route {
            path: path.into(),
            guard: Some(Arc::new(guard)),
            handler: boxed(handler),
        });
        self
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Runs the auth phase and then the request phase for one request.
    /// Unmatched paths get a `404`.
    pub fn dispatch(&self, req: &FixtureRequest) -> Response<Full<Bytes>> {
        let route = self.routes.iter().find(|route| route.path == req.path());

        let authorized = route
            .and_then(|route| route.guard.as_ref())
            .map_or(true, |guard| guard.allows(req));
        trace!(path = req.path(), authorized, "auth checked");
        if !authorized {
            debug!(path = req.path(), "rejecting unauthenticated request");
            return auth::challenge(&self.realm).unwrap_or_else(|err| {
                error!("error while building auth challenge: {}", err);
                internal_server_error()
            });
        }

        let Some(route) = route else {
            debug!(method = %req.method(), path = req.path(), "no route matched");
            return not_found();
        };
        trace!(path = req.path(), "routed");
        (route.handler)(req)
    }
}

fn not_found() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::from(Bytes::from_static(b"Not Found")));
    *resp.status_mut() = StatusCode::NOT_FOUND;
    resp
}
