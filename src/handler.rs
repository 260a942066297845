use std::{convert::Infallible, fmt::Display, sync::Arc};

use http_body_util::Full;
use hyper::{body::Bytes, Response, StatusCode};
use tracing::error;

use crate::FixtureRequest;

/// A handler that can be registered on a [Router](crate::Router). If the
/// handler returns an error, the error will be logged and a 500 response will
/// be returned to the client.
pub trait Handler: Send + Sync + 'static {
    type Error: Display;
    fn handle(&self, req: &FixtureRequest) -> Result<Response<Full<Bytes>>, Self::Error>;
}

impl<F, E> Handler for F
where
    F: Fn(&FixtureRequest) -> Result<Response<Full<Bytes>>, E> + Send + Sync + 'static,
    E: Display,
{
    type Error = E;

    fn handle(&self, req: &FixtureRequest) -> Result<Response<Full<Bytes>>, Self::Error> {
        self(req)
    }
}

/// Converts a value into a [Result](Result)<T, [Infallible](Infallible)> so it
/// can be used as the return type for a Handler.
///
/// Useful for closures where you can't specify the return type and you don't
/// need to return an error.
pub fn handle_ok<T>(val: T) -> Result<T, Infallible> {
    Ok(val)
}

/// A handler with its error type erased, as stored in a route table.
pub(crate) type BoxedHandler = Arc<dyn Fn(&FixtureRequest) -> Response<Full<Bytes>> + Send + Sync>;

pub(crate) fn boxed<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(move |req: &FixtureRequest| run_handler(&handler, req))
}

pub(crate) fn run_handler<H: Handler>(handler: &H, req: &FixtureRequest) -> Response<Full<Bytes>> {
    match handler.handle(req) {
        Ok(resp) => resp,
        Err(err) => {
            error!(path = req.path(), "error while handling request: {}", err);
            internal_server_error()
        }
    }
}

pub(crate) fn internal_server_error() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::from(Bytes::from_static(b"Internal Server Error")));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp
}
