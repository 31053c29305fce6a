//! Uniform random selection among proxy routes.

use rand::Rng;

/// Picks one of a fixed, non-empty set of routes per request.
///
/// With a single route the choice is fixed; with several, every route is
/// equally likely on every call. No state is kept between calls.
#[derive(Debug, Clone)]
pub struct ProxyRotator<T> {
    routes: Vec<T>,
}

impl<T> ProxyRotator<T> {
    /// `None` when `routes` is empty.
    pub fn new(routes: Vec<T>) -> Option<Self> {
        if routes.is_empty() {
            None
        } else {
            Some(Self { routes })
        }
    }

    pub fn pick(&self) -> &T {
        if self.routes.len() == 1 {
            return &self.routes[0];
        }
        let index = rand::rng().random_range(0..self.routes.len());
        &self.routes[index]
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[T] {
        &self.routes
    }
}
