//! Permission middleware and the pipeline running it.

use std::fmt;
use std::sync::Arc;

use crate::request::Request;
use crate::response::RestError;

/// Result of a permission step: pass, or reject with an error value.
pub type Verdict = Result<(), RestError>;

/// A permission step run before a route handler.
///
/// A step either calls `next.run(request)` to hand over to the rest of the
/// chain, or returns without calling it. Returning without calling `next`
/// ends the chain with that verdict.
///
/// # Example
///
/// ```
/// use oxide_rest_router::{reject, Middleware, Next, Request, Verdict};
///
/// struct RequireToken;
///
/// impl Middleware for RequireToken {
///     fn handle(&self, request: &Request, next: Next<'_>) -> Verdict {
///         if request.get_header("Authorization").is_none() {
///             return Err(reject());
///         }
///         next.run(request)
///     }
/// }
/// ```
pub trait Middleware: Send + Sync {
    /// Handles the request.
    fn handle(&self, request: &Request, next: Next<'_>) -> Verdict;
}

/// A shared middleware reference.
pub type MiddlewareRef = Arc<dyn Middleware>;

/// The remainder of a middleware chain.
pub struct Next<'a> {
    rest: &'a [MiddlewareRef],
    destination: &'a dyn Fn(&Request) -> Verdict,
}

impl Next<'_> {
    /// Runs the next step, or the destination when the chain is exhausted.
    pub fn run(self, request: &Request) -> Verdict {
        match self.rest.split_first() {
            Some((step, rest)) => step.handle(
                request,
                Next {
                    rest,
                    destination: self.destination,
                },
            ),
            None => (self.destination)(request),
        }
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.rest.len())
            .finish_non_exhaustive()
    }
}

struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&Request, Next<'_>) -> Verdict + Send + Sync,
{
    fn handle(&self, request: &Request, next: Next<'_>) -> Verdict {
        (self.0)(request, next)
    }
}

/// Turns a closure into middleware.
///
/// ```
/// use oxide_rest_router::{from_fn, reject};
///
/// let guard = from_fn(|request, next| {
///     if request.param("secret").is_none() {
///         return Err(reject());
///     }
///     next.run(request)
/// });
/// # let _ = guard;
/// ```
pub fn from_fn<F>(function: F) -> MiddlewareRef
where
    F: Fn(&Request, Next<'_>) -> Verdict + Send + Sync + 'static,
{
    Arc::new(FnMiddleware(function))
}

/// Values that flatten into a list of middleware.
pub trait IntoMiddleware {
    /// Flattens `self` into middleware references.
    fn into_middleware(self) -> Vec<MiddlewareRef>;
}

impl IntoMiddleware for MiddlewareRef {
    fn into_middleware(self) -> Vec<MiddlewareRef> {
        vec![self]
    }
}

impl<T: IntoMiddleware> IntoMiddleware for Vec<T> {
    fn into_middleware(self) -> Vec<MiddlewareRef> {
        self.into_iter().flat_map(IntoMiddleware::into_middleware).collect()
    }
}

impl<T: IntoMiddleware, const N: usize> IntoMiddleware for [T; N] {
    fn into_middleware(self) -> Vec<MiddlewareRef> {
        self.into_iter().flat_map(IntoMiddleware::into_middleware).collect()
    }
}

impl<T: IntoMiddleware + Clone> IntoMiddleware for &[T] {
    fn into_middleware(self) -> Vec<MiddlewareRef> {
        self.iter()
            .cloned()
            .flat_map(IntoMiddleware::into_middleware)
            .collect()
    }
}

/// Sends a request through a middleware chain.
///
/// ```
/// use oxide_rest_router::{from_fn, reject, Pipeline, Request};
///
/// let chain = vec![from_fn(|_, _| Err(reject()))];
/// let request = Request::get("/devly/v1/author/1");
///
/// let verdict = Pipeline::send(&request).through(&chain).then(|_| Ok(()));
/// assert_eq!(verdict.unwrap_err().status(), 401);
/// ```
#[derive(Clone, Copy)]
pub struct Pipeline<'a> {
    request: &'a Request,
    pipes: &'a [MiddlewareRef],
}

impl<'a> Pipeline<'a> {
    /// Starts a pipeline for `request`.
    #[must_use]
    pub const fn send(request: &'a Request) -> Self {
        Self {
            request,
            pipes: &[],
        }
    }

    /// Sets the middleware to run, in order.
    #[must_use]
    pub fn through(mut self, pipes: &'a [MiddlewareRef]) -> Self {
        self.pipes = pipes;
        self
    }

    /// Runs the chain, ending with `destination` when every step passes.
    pub fn then<F>(self, destination: F) -> Verdict
    where
        F: Fn(&Request) -> Verdict,
    {
        Next {
            rest: self.pipes,
            destination: &destination,
        }
        .run(self.request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::response::reject;

    fn counting(counter: &Arc<AtomicUsize>) -> MiddlewareRef {
        let counter = Arc::clone(counter);
        from_fn(move |request, next| {
            counter.fetch_add(1, Ordering::SeqCst);
            next.run(request)
        })
    }

    #[test]
    fn test_all_steps_pass() {
        let counter = Arc::new(AtomicUsize::new(0));
        let chain = vec![counting(&counter), counting(&counter)];
        let request = Request::get("/");

        let verdict = Pipeline::send(&request).through(&chain).then(|_| Ok(()));
        assert!(verdict.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rejection_short_circuits() {
        let counter = Arc::new(AtomicUsize::new(0));
        let chain = vec![from_fn(|_, _| Err(reject())), counting(&counter)];
        let request = Request::get("/");

        let verdict = Pipeline::send(&request)
            .through(&chain)
            .then(|_| panic!("destination must not run"));
        assert_eq!(verdict, Err(reject()));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pass_without_next_skips_rest() {
        let counter = Arc::new(AtomicUsize::new(0));
        let chain = vec![from_fn(|_, _| Ok(())), counting(&counter)];
        let request = Request::get("/");

        assert!(Pipeline::send(&request).through(&chain).then(|_| Ok(())).is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_flattening() {
        let counter = Arc::new(AtomicUsize::new(0));
        let single = counting(&counter);
        let nested = vec![vec![counting(&counter)], vec![counting(&counter), single.clone()]];

        assert_eq!(single.into_middleware().len(), 1);
        assert_eq!(nested.into_middleware().len(), 3);
        assert_eq!([counting(&counter), counting(&counter)].into_middleware().len(), 2);
    }
}
