use proptest::prelude::*;
use shared::{
    domain::AddressHash,
    protocol::{VerificationMessage, VerificationOutcome},
};

use super::*;
use crate::controller::actions::{ElementFields, PageLoad};

fn page_load(beyond_page_one: bool) -> Action {
    Action::PageLoad(PageLoad {
        address_hash: AddressHash::new("0xabc"),
        filter: None,
        beyond_page_one,
    })
}

fn result(outcome: VerificationOutcome) -> Action {
    Action::VerificationResult(VerificationMessage {
        verification_result: outcome,
    })
}

fn apply(actions: &[Action]) -> Session {
    actions
        .iter()
        .fold(Session::default(), |state, action| reduce(&state, action))
}

#[test]
fn disconnect_is_recorded_on_first_page() {
    let state = apply(&[page_load(false), Action::ChannelDisconnected]);
    assert!(state.channel_disconnected);
    assert_eq!(state.address_hash, Some(AddressHash::new("0xabc")));
}

#[test]
fn disconnect_is_suppressed_beyond_page_one() {
    let state = apply(&[page_load(true), Action::ChannelDisconnected]);
    assert!(!state.channel_disconnected);
}

#[test]
fn rejected_result_overwrites_pending_markup() {
    let first = apply(&[result(VerificationOutcome::Rejected("<form>a</form>".into()))]);
    assert_eq!(first.pending_form_markup.as_deref(), Some("<form>a</form>"));

    let second = reduce(
        &first,
        &result(VerificationOutcome::Rejected("<form>b</form>".into())),
    );
    assert_eq!(second.pending_form_markup.as_deref(), Some("<form>b</form>"));
}

#[test]
fn verified_result_is_a_terminal_marker() {
    let state = apply(&[page_load(false), result(VerificationOutcome::Verified)]);
    assert!(state.verified);
    assert_eq!(state.pending_form_markup, None);

    let after = reduce(
        &state,
        &result(VerificationOutcome::Rejected("<form/>".into())),
    );
    assert_eq!(after, state);
}

#[test]
fn page_load_applies_only_once() {
    let state = apply(&[
        page_load(false),
        Action::PageLoad(PageLoad {
            address_hash: AddressHash::new("0xdef"),
            filter: Some("to".into()),
            beyond_page_one: true,
        }),
    ]);
    assert_eq!(state.address_hash, Some(AddressHash::new("0xabc")));
    assert_eq!(state.filter, None);
    assert!(!state.beyond_page_one);
}

#[test]
fn elements_load_merges_only_supplied_fields() {
    let loaded = apply(&[Action::PageLoad(PageLoad {
        address_hash: AddressHash::new("0xabc"),
        filter: Some("from".into()),
        beyond_page_one: false,
    })]);
    let unchanged = reduce(&loaded, &Action::ElementsLoad(ElementFields::default()));
    assert_eq!(unchanged, loaded);

    let merged = reduce(
        &loaded,
        &Action::ElementsLoad(ElementFields {
            filter: Some("to".into()),
        }),
    );
    assert_eq!(merged.filter.as_deref(), Some("to"));
    assert_eq!(merged.address_hash, loaded.address_hash);
}

#[test]
fn navigation_started_is_recorded() {
    let state = apply(&[page_load(false), Action::NavigationStarted]);
    assert!(state.navigation_pending);
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        any::<bool>().prop_map(page_load),
        proptest::option::of("[a-z]{0,6}")
            .prop_map(|filter| Action::ElementsLoad(ElementFields { filter })),
        Just(Action::ChannelDisconnected),
        Just(Action::NavigationStarted),
        Just(result(VerificationOutcome::Verified)),
        "<form>[a-z]{0,8}</form>"
            .prop_map(|markup| result(VerificationOutcome::Rejected(markup))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn reduce_is_deterministic(actions in prop::collection::vec(arb_action(), 0..24)) {
        prop_assert_eq!(apply(&actions), apply(&actions));
    }

    #[test]
    fn disconnected_never_reverts(actions in prop::collection::vec(arb_action(), 0..24)) {
        let mut state = Session::default();
        let mut seen = false;
        for action in &actions {
            state = reduce(&state, action);
            if seen {
                prop_assert!(state.channel_disconnected);
            }
            seen |= state.channel_disconnected;
        }
    }

    #[test]
    fn paginated_sessions_never_show_disconnects(
        actions in prop::collection::vec(arb_action(), 0..24)
    ) {
        let mut state = reduce(&Session::default(), &page_load(true));
        for action in &actions {
            state = reduce(&state, action);
            prop_assert!(!state.channel_disconnected);
        }
    }
}
