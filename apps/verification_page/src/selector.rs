//! Exclusive method choice, the optimization / autodetect toggles and the
//! library form groups.

use std::{cell::RefCell, time::Duration};

use shared::domain::VerificationMethod;
use tracing::debug;

use crate::dom::{Behavior, PageDom, Region, ACTIVE_CLASS};

/// Delay after first layout before the default method is selected, so the
/// control exists when it is activated.
pub const DEFAULT_SELECTION_DELAY: Duration = Duration::from_millis(10);

pub struct VerificationTypeSelector;

impl VerificationTypeSelector {
    /// Shows the action button of `method` and hides the other three.
    pub fn select(dom: &mut dyn PageDom, method: VerificationMethod) {
        debug!(?method, "selector: method selected");
        for candidate in VerificationMethod::ALL {
            dom.set_visible(Region::MethodButton(candidate), candidate == method);
        }
    }

    pub fn selected(dom: &dyn PageDom) -> Option<VerificationMethod> {
        let mut visible = VerificationMethod::ALL
            .into_iter()
            .filter(|method| dom.is_visible(Region::MethodButton(*method)));
        match (visible.next(), visible.next()) {
            (Some(method), None) => Some(method),
            _ => None,
        }
    }

    pub async fn select_default_after_layout<D: PageDom>(dom: &RefCell<D>) {
        tokio::time::sleep(DEFAULT_SELECTION_DELAY).await;
        Self::select(&mut *dom.borrow_mut(), VerificationMethod::DEFAULT);
    }
}

pub struct FormToggles;

impl FormToggles {
    pub fn optimization(dom: &mut dyn PageDom, enabled: bool) {
        dom.set_visible(Region::OptimizationRuns, enabled);
    }

    /// Constructor arguments are only asked for when autodetection is off.
    pub fn autodetect(dom: &mut dyn PageDom, enabled: bool) {
        dom.set_visible(Region::ConstructorArguments, !enabled);
    }
}

pub struct LibraryPanel;

impl LibraryPanel {
    pub fn open(dom: &mut dyn PageDom) {
        dom.set_visible(Region::LibrariesWrapper, true);
        dom.set_visible(Region::AddLibrariesButton, false);
    }

    pub fn active_count(dom: &dyn PageDom) -> usize {
        (0..dom.library_group_count())
            .filter(|index| dom.has_class(Region::LibraryGroup(*index), ACTIVE_CLASS))
            .count()
    }

    /// Activates the group after the last active one; hides the "add"
    /// control once every group is active.
    pub fn add_library(dom: &mut dyn PageDom) {
        let total = dom.library_group_count();
        let last_active =
            (0..total).rfind(|index| dom.has_class(Region::LibraryGroup(*index), ACTIVE_CLASS));
        if let Some(next) = last_active.map(|index| index + 1).filter(|next| *next < total) {
            dom.set_class(Region::LibraryGroup(next), ACTIVE_CLASS, true);
        }
        if Self::active_count(dom) == total {
            dom.set_visible(Region::AddLibraryWrapper, false);
        }
    }

    pub fn reset(dom: &mut dyn PageDom) {
        for index in 0..dom.library_group_count() {
            dom.set_class(Region::LibraryGroup(index), ACTIVE_CLASS, index == 0);
        }
        dom.set_visible(Region::LibrariesWrapper, false);
        dom.set_visible(Region::AddLibrariesButton, true);
        dom.set_visible(Region::AddLibraryWrapper, true);
    }
}

/// Binds the form's own behaviors. Run on first render and again after the
/// form is replaced.
pub fn attach_form_behaviors(dom: &mut dyn PageDom) {
    dom.bind(Behavior::LoadingAnimation);
    dom.bind(Behavior::Libraries);
    dom.bind(Behavior::Toggles);
}

#[cfg(test)]
#[path = "tests/selector_tests.rs"]
mod tests;
