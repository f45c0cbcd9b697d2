//! Leaving the page once verification succeeds.

use std::{cell::RefCell, rc::Rc};

use tracing::info;

use crate::controller::Session;

pub trait Navigator {
    fn navigate(&mut self, url: &str);
}

/// Records visited URLs instead of driving a browser.
#[derive(Debug, Clone, Default)]
pub struct HeadlessNavigator {
    visited: Rc<RefCell<Vec<String>>>,
}

impl HeadlessNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }
}

impl Navigator for HeadlessNavigator {
    fn navigate(&mut self, url: &str) {
        info!(url, "navigation: leaving verification page");
        self.visited.borrow_mut().push(url.to_string());
    }
}

/// Where a verified contract is shown: the page URL cut at
/// `/contract_verifications`, then at `/verify`, plus `/contracts`.
pub fn redirect_target(page_url: &str) -> String {
    let base = page_url
        .split("/contract_verifications")
        .next()
        .unwrap_or(page_url);
    let base = base.split("/verify").next().unwrap_or(base);
    format!("{base}/contracts")
}

/// Performs the redirect the first time it observes a verified session.
pub struct NavigationSubscriber<N: Navigator> {
    navigator: N,
    target: String,
    fired: bool,
}

impl<N: Navigator> NavigationSubscriber<N> {
    pub fn new(navigator: N, target: impl Into<String>) -> Self {
        Self {
            navigator,
            target: target.into(),
            fired: false,
        }
    }

    pub fn fired(&self) -> bool {
        self.fired
    }

    /// Returns `true` when this call performed the navigation.
    pub fn observe(&mut self, state: &Session) -> bool {
        if self.fired || !state.verified {
            return false;
        }
        self.fired = true;
        self.navigator.navigate(&self.target);
        true
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
