//! An embedded HTTP server with a fixed table of canned routes, for exercising
//! an HTTP client under test. It answers known paths with fixed status codes,
//! headers and bodies, guards one path behind HTTP Basic Authentication and
//! reflects request headers on another.
//!
//! The server runs on its own thread. [FixtureServer::start] blocks until the
//! port is listening and [FixtureServer::stop] blocks until it has been
//! released, so test setup and teardown never race the socket.
//!
//! Currently only supports HTTP/1.1 and does not support TLS.
//!
//! ## Routes
//!
//! | Path | Status | Body |
//! |---|---|---|
//! | `/hello.html` | 200 | `Hello world!` |
//! | `/basic_auth.html` | 200 with valid Basic credentials, else 401 | `Header reflect` |
//! | `/basic.json` | 200 | a one-element JSON array |
//! | `/header_reflect.html` | 200 | `Header reflect` |
//! | `/temporary_redirect.html` | 302 to `hello.html` | `Found` |
//! | `/permanent_redirect.html` | 301 to `hello.html` | `Moved Permanently` |
//! | `/two_redirects.html` | 301 to `permanent_redirect.html` | `Moved Permanently` |
//! | `/url_post.html` | 201 | JSON echo of form fields `x`, `y` and their sum |
//!
//! Any other path gets a 404.
//!
//! ## Example
//!
//! ```
//! use mini_http_fixture::{Config, FixtureServer};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut server = FixtureServer::new(Config::default().with_port(0));
//! server.start().expect("start server");
//!
//! let res = reqwest::get(server.url("/hello.html").to_string())
//!     .await
//!     .expect("send request");
//!
//! assert_eq!(res.status(), 200);
//! assert_eq!(res.text().await.expect("read response"), "Hello world!");
//!
//! server.stop().expect("stop server");
//! # });
//! ```
//!
//! There are also more examples as tests.

mod auth;
pub mod base64;
mod config;
mod error;
mod handler;
mod request;
mod router;
pub mod routes;
mod server;

pub use auth::{ascii_casecmp_prefix, Credentials};
pub use config::{Config, DEFAULT_PORT, DEFAULT_REALM};
pub use error::Error;
pub use handler::{handle_ok, Handler};
pub use request::{FixtureRequest, GetRequestBody};
pub use router::{AuthGuard, Router};
pub use server::FixtureServer;

pub use hyper;
