//! The session object.
//!
//! An [`Env`] holds the values shared by all tasks created from it.  It
//! is immutable once tasks borrow it, so tasks of the same environment
//! can be solved on different threads.

/// Default magnitude at and above which bound values are infinite
pub const INFINITY_DEFAULT: f64 = 1e30;

/// Session-wide settings, passed by reference to every [`Task`](crate::task::Task)
#[derive(Debug, Clone)]
pub struct Env {
    infinity: f64,
    num_threads: usize,
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl Env {
    pub fn new() -> Self {
        Self {
            infinity: INFINITY_DEFAULT,
            num_threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }

    /// Set the bound magnitude treated as infinite
    pub fn with_infinity(mut self, infinity: f64) -> Self {
        if infinity > 0.0 {
            self.infinity = infinity;
        }
        self
    }

    /// Bound the number of worker threads of concurrent solves
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads.max(1);
        self
    }

    pub fn infinity(&self) -> f64 {
        self.infinity
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// true if `value` counts as an infinite bound
    pub fn is_infinite(&self, value: f64) -> bool {
        value.abs() >= self.infinity
    }
}

#[test]
fn test_env_infinity() {
    let env = Env::new();
    assert!(env.is_infinite(1e30));
    assert!(env.is_infinite(-2e30));
    assert!(!env.is_infinite(1e29));

    let env = Env::new().with_infinity(1e10).with_num_threads(0);
    assert!(env.is_infinite(1e10));
    assert_eq!(env.num_threads(), 1);
}
