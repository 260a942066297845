use async_trait::async_trait;
use http_body_util::BodyExt;
use hyper::{
    body::{Body, Bytes},
    header::AsHeaderName,
    HeaderMap, Method, Request, Uri,
};
use url::form_urlencoded;

/// A fully received request as seen by guards and handlers. Header lookups are
/// case-insensitive and iteration follows the order the headers arrived in.
#[derive(Debug, Clone)]
pub struct FixtureRequest {
    inner: Request<Bytes>,
}

impl FixtureRequest {
    /// Reads the whole body of an incoming request.
    pub async fn collect<B>(req: Request<B>) -> Result<Self, B::Error>
    where
        B: Body<Data = Bytes> + Send + 'static,
        <B as Body>::Error: Send,
    {
        let (parts, body) = req.into_parts();
        let body = Request::new(body).body_bytes().await?;
        Ok(Self {
            inner: Request::from_parts(parts, body),
        })
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// The request path without the query string.
    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns the first value of the named header, if it is present and is
    /// visible ASCII.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.inner
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    /// Looks up a form parameter, first in the URL query string and then in
    /// the form-encoded body. The first occurrence wins.
    pub fn form_value(&self, name: &str) -> Option<String> {
        let query = self.inner.uri().query().unwrap_or_default().as_bytes();
        find_form_value(query, name).or_else(|| find_form_value(self.inner.body(), name))
    }
}

impl From<Request<Bytes>> for FixtureRequest {
    fn from(inner: Request<Bytes>) -> Self {
        Self { inner }
    }
}

fn find_form_value(encoded: &[u8], name: &str) -> Option<String> {
    form_urlencoded::parse(encoded)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// A handy extension to [hyper::Request](hyper::Request) that allows for easily
/// reading the request body as a single `Bytes` object.
#[async_trait]
pub trait GetRequestBody {
    type Error;
    async fn body_bytes(self) -> Result<Bytes, Self::Error>;
}

#[async_trait]
impl<B> GetRequestBody for Request<B>
where
    B: Body<Data = Bytes> + Send + 'static,
    <B as Body>::Error: Send,
{
    type Error = B::Error;

    async fn body_bytes(self) -> Result<Bytes, Self::Error> {
        self.into_body().collect().await.map(|full| full.to_bytes())
    }
}
