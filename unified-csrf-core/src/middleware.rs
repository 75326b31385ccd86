//! Async middleware and the chain that runs them around a handler.

use crate::logging::{debug, trace};
use crate::{Error, HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type ResponseFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// Continuation running the rest of the chain
pub type Next = Box<dyn FnOnce(HttpRequest) -> ResponseFuture + Send>;

/// Endpoint at the bottom of a chain
pub type HandlerFn = Arc<dyn Fn(HttpRequest) -> ResponseFuture + Send + Sync>;

/// Wrap an async closure as a [`HandlerFn`]
pub fn handler<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

#[async_trait]
pub trait Middleware: Send + Sync {
    /// Handle a request, calling `next` to run everything inside this middleware
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error>;
}

/// Ordered middleware stack
///
/// The first middleware added is the outermost: it sees the request first
/// and the response last. Cloning is cheap and shares the stack.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    layers: Arc<[Arc<dyn Middleware>]>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a middleware inside the ones already added
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        let mut layers = self.layers.to_vec();
        layers.push(Arc::new(middleware));
        self.layers = layers.into();
    }

    pub fn with<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.use_middleware(middleware);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Run a request through every middleware and then `handler`
    pub async fn apply(&self, req: HttpRequest, handler: HandlerFn) -> Result<HttpResponse, Error> {
        debug!(
            layers = self.layers.len(),
            method = %req.method,
            path = %req.path,
            "Dispatching request"
        );
        self.dispatch(0, req, handler).await
    }

    fn dispatch(&self, position: usize, req: HttpRequest, endpoint: HandlerFn) -> ResponseFuture {
        let Some(layer) = self.layers.get(position).cloned() else {
            trace!("Reached handler");
            return endpoint(req);
        };

        trace!(position, "Entering middleware");
        let rest = self.clone();
        let next: Next = Box::new(move |req| rest.dispatch(position + 1, req, endpoint));
        Box::pin(async move { layer.handle(req, next).await })
    }
}
