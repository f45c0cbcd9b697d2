//! Wires the store, renderers, channel subscription and upload stager of
//! one page view together.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use client_core::{
    ChannelClient, ChannelError, ChannelSubscription, ChannelTransport, SubmissionOutcome,
    TransportEvent, UploadSubmitter,
};
use shared::{
    domain::{AddressHash, FileDescriptor, UploadMode, VerificationMethod},
    protocol::{VerificationMessage, VERIFICATION_EVENT},
};
use tracing::{debug, info, warn};

use crate::{
    binder::{render_disconnect_banner, ElementBinder, FormReplacement},
    controller::{Action, PageLoad, Session, StateStore},
    dom::{Behavior, PageDom, Region, HIDDEN_CLASS},
    navigation::{redirect_target, NavigationSubscriber, Navigator},
    params::PageParams,
    selector::{attach_form_behaviors, FormToggles, LibraryPanel, VerificationTypeSelector},
    stager::{UploadRejection, UploadStager},
};

/// Which page the script runs on. Supplied by the host, never probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Verification { mode: UploadMode },
    ChooseType,
}

/// User interactions with the verification form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Optimization(bool),
    Autodetect(bool),
    AddLibraries,
    AddLibrary,
    ResetLibraries,
    Submit(UploadMode),
}

/// Maps the two inbound channel event classes onto store actions.
pub fn install_channel_hooks(subscription: &mut ChannelSubscription<Action>) {
    subscription.on_transport_error(|| Action::ChannelDisconnected);
    subscription.on_message(VERIFICATION_EVENT, |payload| {
        match VerificationMessage::from_payload(payload) {
            Ok(message) => Some(Action::VerificationResult(message)),
            Err(err) => {
                warn!("page: ignoring malformed verification message: {err}");
                None
            }
        }
    });
}

pub struct VerificationPage<D: PageDom + 'static> {
    address_hash: AddressHash,
    dom: Rc<RefCell<D>>,
    store: StateStore,
    stager: Rc<RefCell<UploadStager>>,
    navigated: Rc<Cell<bool>>,
}

impl<D: PageDom + 'static> VerificationPage<D> {
    pub fn load(
        params: &PageParams,
        address_hash: AddressHash,
        mode: UploadMode,
        dom: Rc<RefCell<D>>,
        navigator: impl Navigator + 'static,
        submitter: Box<dyn UploadSubmitter>,
    ) -> Self {
        info!(
            address = %address_hash,
            mode = mode.as_str(),
            beyond_page_one = params.beyond_page_one,
            "page: loading verification form"
        );

        let mut store = StateStore::new();
        store.dispatch(Action::PageLoad(PageLoad {
            address_hash: address_hash.clone(),
            filter: params.filter.clone(),
            beyond_page_one: params.beyond_page_one,
        }));

        let stager = Rc::new(RefCell::new(UploadStager::new(
            mode,
            address_hash.clone(),
            submitter,
        )));
        {
            let mut dom = dom.borrow_mut();
            attach_form_behaviors(&mut *dom);
            stager.borrow().attach(&mut *dom);
        }

        let mut binder = ElementBinder::new();
        binder.register(Region::DisconnectBanner, render_disconnect_banner);
        let reattach_stager = Rc::clone(&stager);
        let mut replacement = FormReplacement::new(move |dom: &mut dyn PageDom| {
            attach_form_behaviors(dom);
            reattach_stager.borrow().attach(dom);
        });
        binder.register(Region::VerificationForm, move |dom, region, state| {
            replacement.render(dom, region, state)
        });
        binder.bind_all(&mut store, Rc::clone(&dom));

        let navigated = Rc::new(Cell::new(false));
        let mut navigation = NavigationSubscriber::new(navigator, redirect_target(&params.page_url));
        let fired = Rc::clone(&navigated);
        store.subscribe(move |state| {
            if navigation.observe(state) {
                fired.set(true);
            }
        });

        Self {
            address_hash,
            dom,
            store,
            stager,
            navigated,
        }
    }

    pub fn state(&self) -> &Session {
        self.store.state()
    }

    pub fn dom(&self) -> Rc<RefCell<D>> {
        Rc::clone(&self.dom)
    }

    pub fn navigated(&self) -> bool {
        self.navigated.get()
    }

    pub fn topic(&self) -> String {
        self.address_hash.channel_topic()
    }

    pub async fn subscribe<T: ChannelTransport>(
        &self,
        client: &ChannelClient<T>,
    ) -> Result<ChannelSubscription<Action>, ChannelError> {
        let mut subscription = client.subscribe(&self.topic()).await?;
        install_channel_hooks(&mut subscription);
        Ok(subscription)
    }

    pub fn dispatch(&mut self, action: Action) {
        self.store.dispatch(action);
        // Leaving the page raises the browser's unload signal.
        if self.navigated.get() && !self.store.state().navigation_pending {
            self.store.dispatch(Action::NavigationStarted);
        }
    }

    pub fn handle_transport_event(
        &mut self,
        subscription: &ChannelSubscription<Action>,
        event: TransportEvent,
    ) {
        if let Some(action) = subscription.route(event) {
            self.dispatch(action);
        }
    }

    pub fn handle_control(&mut self, control: Control) {
        let mut dom = self.dom.borrow_mut();
        let dom: &mut dyn PageDom = &mut *dom;
        match control {
            Control::Optimization(enabled) if dom.is_bound(Behavior::Toggles) => {
                FormToggles::optimization(dom, enabled)
            }
            Control::Autodetect(enabled) if dom.is_bound(Behavior::Toggles) => {
                FormToggles::autodetect(dom, enabled)
            }
            Control::AddLibraries if dom.is_bound(Behavior::Libraries) => LibraryPanel::open(dom),
            Control::AddLibrary if dom.is_bound(Behavior::Libraries) => {
                LibraryPanel::add_library(dom)
            }
            Control::ResetLibraries if dom.is_bound(Behavior::Libraries) => LibraryPanel::reset(dom),
            Control::Submit(mode) => {
                if dom.is_bound(Behavior::LoadingAnimation) {
                    dom.set_class(Region::LoadingIndicator, HIDDEN_CLASS, false);
                }
                let mut stager = self.stager.borrow_mut();
                if dom.is_bound(Behavior::Upload) && stager.mode() == mode {
                    stager.process_queue(dom);
                } else {
                    debug!(?mode, "page: submit button without an upload widget");
                }
            }
            other => debug!(?other, "page: control has no bound behavior"),
        }
    }

    pub fn add_file(&mut self, file: FileDescriptor) -> Result<(), UploadRejection> {
        let mut dom = self.dom.borrow_mut();
        self.stager.borrow_mut().add_file(&mut *dom, file)
    }

    pub fn remove_file(&mut self, file: &FileDescriptor) -> bool {
        let mut dom = self.dom.borrow_mut();
        self.stager.borrow_mut().remove_file(&mut *dom, file)
    }

    pub fn queue_length(&self) -> usize {
        self.stager.borrow().queue_length()
    }

    pub fn submit_enabled(&self) -> bool {
        self.stager.borrow().submit_enabled()
    }

    /// The submission transport finished; the form itself is updated by the
    /// channel push that follows.
    pub fn submission_finished(&mut self, outcome: &SubmissionOutcome) {
        match outcome {
            SubmissionOutcome::Accepted { status } => {
                info!(status, "page: verification request accepted")
            }
            SubmissionOutcome::Failed(reason) => warn!(%reason, "page: verification request failed"),
        }
        self.dom
            .borrow_mut()
            .set_class(Region::LoadingIndicator, HIDDEN_CLASS, true);
    }
}

/// The method chooser shown before the verification form.
pub struct ChooseTypePage<D: PageDom> {
    dom: Rc<RefCell<D>>,
}

impl<D: PageDom> ChooseTypePage<D> {
    pub fn new(dom: Rc<RefCell<D>>) -> Self {
        Self { dom }
    }

    pub async fn enter(&self) {
        VerificationTypeSelector::select_default_after_layout(&self.dom).await;
    }

    pub fn select(&self, method: VerificationMethod) {
        VerificationTypeSelector::select(&mut *self.dom.borrow_mut(), method);
    }

    pub fn selected(&self) -> Option<VerificationMethod> {
        VerificationTypeSelector::selected(&*self.dom.borrow())
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
