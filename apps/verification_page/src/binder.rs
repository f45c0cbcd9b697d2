//! Region renderers driven by store transitions.

use std::{cell::RefCell, rc::Rc};

use tracing::info;

use crate::{
    controller::{Session, StateStore},
    dom::{PageDom, Region},
};

type RenderFn = Box<dyn FnMut(&mut dyn PageDom, Region, &Session)>;

#[derive(Default)]
pub struct ElementBinder {
    entries: Vec<(Region, RenderFn)>,
}

impl ElementBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        region: Region,
        render: impl FnMut(&mut dyn PageDom, Region, &Session) + 'static,
    ) {
        self.entries.push((region, Box::new(render)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the current state once, then re-renders every region, in
    /// registration order, after each store transition.
    pub fn bind_all<D: PageDom + 'static>(self, store: &mut StateStore, dom: Rc<RefCell<D>>) {
        let mut entries = self.entries;
        let mut render_all = move |state: &Session| {
            for (region, render) in entries.iter_mut() {
                let mut guard = dom.borrow_mut();
                render(&mut *guard, *region, state);
            }
        };
        render_all(store.state());
        store.subscribe(render_all);
    }
}

/// Shows the disconnect banner while the channel is down, unless the page
/// is already being left.
pub fn render_disconnect_banner(dom: &mut dyn PageDom, region: Region, state: &Session) {
    let visible = state.channel_disconnected && !state.navigation_pending;
    if dom.is_visible(region) != visible {
        dom.set_visible(region, visible);
    }
}

/// Swaps in server-rendered form markup and re-attaches the form's
/// behaviors. Markup already applied is not applied again.
pub struct FormReplacement {
    applied: Option<String>,
    reattach: Box<dyn FnMut(&mut dyn PageDom)>,
}

impl FormReplacement {
    pub fn new(reattach: impl FnMut(&mut dyn PageDom) + 'static) -> Self {
        Self {
            applied: None,
            reattach: Box::new(reattach),
        }
    }

    pub fn render(&mut self, dom: &mut dyn PageDom, region: Region, state: &Session) {
        let Some(markup) = &state.pending_form_markup else {
            return;
        };
        if self.applied.as_ref() == Some(markup) {
            return;
        }
        info!(bytes = markup.len(), "binder: replacing verification form");
        dom.replace_with(region, markup);
        self.applied = Some(markup.clone());
        (self.reattach)(dom);
    }
}

#[cfg(test)]
#[path = "tests/binder_tests.rs"]
mod tests;
