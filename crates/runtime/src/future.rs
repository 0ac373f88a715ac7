use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by dyn-compatible async collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
