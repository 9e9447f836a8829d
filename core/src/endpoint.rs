//! Endpoint resolution and rotation.
//!
//! # Design
//! `EndpointResolver` decides which base URL a request goes to:
//!
//! 1. a pinned endpoint always wins;
//! 2. a single-entry pool is returned as is;
//! 3. a larger pool is sampled uniformly at random, and the pick is kept for
//!    [`ROTATION_WINDOW`] before a new one is drawn;
//! 4. with no pool at all the URL is derived from protocol and hostname.
//!
//! Time and randomness are injected through [`Clock`] and
//! [`EndpointSelector`] so rotation can be tested without sleeping. The
//! rotation state sits behind a mutex: concurrent callers may observe either
//! pick during a rotation, never a torn state.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rand::Rng;
use tracing::debug;

use crate::config::ClientConfig;

/// How long a randomly chosen pool endpoint is reused.
pub const ROTATION_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Source of "now" for rotation decisions.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Picks an index into a non-empty endpoint pool.
pub trait EndpointSelector: Send + Sync + fmt::Debug {
    /// Return an index in `0..len`. `len` is always at least 1.
    fn pick(&self, len: usize) -> usize;
}

impl<S: EndpointSelector + ?Sized> EndpointSelector for Arc<S> {
    fn pick(&self, len: usize) -> usize {
        (**self).pick(len)
    }
}

/// Uniform random choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl EndpointSelector for RandomSelector {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Always the same index, clamped to the pool size.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedSelector(pub usize);

impl EndpointSelector for FixedSelector {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

/// Mutable rotation bookkeeping for a multi-entry pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationState {
    pub current_endpoint: Option<String>,
    pub last_randomized_at: Option<Instant>,
}

#[derive(Debug)]
pub struct EndpointResolver {
    clock: Box<dyn Clock>,
    selector: Box<dyn EndpointSelector>,
    state: Mutex<RotationState>,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointResolver {
    pub fn new() -> Self {
        Self {
            clock: Box::new(SystemClock),
            selector: Box::new(RandomSelector),
            state: Mutex::new(RotationState::default()),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_selector(mut self, selector: impl EndpointSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// The base URL for the next request, without credentials.
    pub fn resolve(&self, config: &ClientConfig) -> String {
        if let Some(pinned) = config.endpoint() {
            return pinned.to_string();
        }
        match config.endpoints() {
            [] => config.derived_endpoint(),
            [only] => only.clone(),
            pool => self.rotate(pool),
        }
    }

    /// Forget the current pick so the next resolution starts over.
    pub fn reset(&self) {
        *self.lock() = RotationState::default();
    }

    /// Snapshot of the rotation state.
    pub fn state(&self) -> RotationState {
        self.lock().clone()
    }

    fn rotate(&self, pool: &[String]) -> String {
        let now = self.clock.now();
        let mut state = self.lock();

        if let (Some(current), Some(at)) = (&state.current_endpoint, state.last_randomized_at) {
            if now.saturating_duration_since(at) < ROTATION_WINDOW && pool.contains(current) {
                return current.clone();
            }
        }

        let picked = pool[self.selector.pick(pool.len()).min(pool.len() - 1)].clone();
        debug!(endpoint = %picked, pool_size = pool.len(), "rotated intercom endpoint");
        state.current_endpoint = Some(picked.clone());
        state.last_randomized_at = Some(now);
        picked
    }

    fn lock(&self) -> MutexGuard<'_, RotationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Characters escaped in the userinfo component. `%` is included so a decoded
/// credential always matches what was configured.
const USERINFO: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Insert `app_id:api_key@` after the scheme of `endpoint`, percent-encoding
/// both credentials.
pub fn embed_credentials(endpoint: &str, app_id: &str, api_key: &str) -> String {
    let app_id = utf8_percent_encode(app_id, USERINFO);
    let api_key = utf8_percent_encode(api_key, USERINFO);
    match endpoint.split_once("://") {
        Some((scheme, rest)) => format!("{scheme}://{app_id}:{api_key}@{rest}"),
        None => format!("{app_id}:{api_key}@{endpoint}"),
    }
}
