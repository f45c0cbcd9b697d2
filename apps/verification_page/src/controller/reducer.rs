use shared::{domain::AddressHash, protocol::VerificationOutcome};

use super::actions::Action;

/// Authoritative state of one verification page view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub address_hash: Option<AddressHash>,
    pub filter: Option<String>,
    pub beyond_page_one: bool,
    /// Only ever moves from `false` to `true`.
    pub channel_disconnected: bool,
    /// Server-rendered form (with inline errors) waiting to replace the
    /// visible one.
    pub pending_form_markup: Option<String>,
    /// Terminal: the server accepted the contract source.
    pub verified: bool,
    pub navigation_pending: bool,
}

impl Session {
    pub fn is_loaded(&self) -> bool {
        self.address_hash.is_some()
    }
}

/// Computes the next session. Pure: no I/O, no navigation.
pub fn reduce(state: &Session, action: &Action) -> Session {
    match action {
        Action::PageLoad(load) => {
            if state.is_loaded() {
                return state.clone();
            }
            Session {
                address_hash: Some(load.address_hash.clone()),
                filter: load.filter.clone(),
                beyond_page_one: load.beyond_page_one,
                ..state.clone()
            }
        }
        Action::ElementsLoad(fields) => {
            let mut next = state.clone();
            if let Some(filter) = &fields.filter {
                next.filter = Some(filter.clone());
            }
            next
        }
        Action::ChannelDisconnected => {
            if state.beyond_page_one {
                return state.clone();
            }
            Session {
                channel_disconnected: true,
                ..state.clone()
            }
        }
        Action::VerificationResult(message) => {
            if state.verified {
                return state.clone();
            }
            match &message.verification_result {
                VerificationOutcome::Verified => Session {
                    verified: true,
                    ..state.clone()
                },
                VerificationOutcome::Rejected(markup) => Session {
                    pending_form_markup: Some(markup.clone()),
                    ..state.clone()
                },
            }
        }
        Action::NavigationStarted => Session {
            navigation_pending: true,
            ..state.clone()
        },
    }
}

#[cfg(test)]
#[path = "../tests/reducer_tests.rs"]
mod tests;
