use std::cell::RefCell;

use super::*;
use crate::dom::HeadlessDom;

#[test]
fn selecting_a_method_hides_the_others() {
    let mut dom = HeadlessDom::choose_type_page();
    assert_eq!(VerificationTypeSelector::selected(&dom), None);

    VerificationTypeSelector::select(&mut dom, VerificationMethod::Sourcify);
    assert_eq!(
        VerificationTypeSelector::selected(&dom),
        Some(VerificationMethod::Sourcify)
    );

    VerificationTypeSelector::select(&mut dom, VerificationMethod::StandardJsonInput);
    let visible: Vec<_> = VerificationMethod::ALL
        .into_iter()
        .filter(|method| dom.is_visible(Region::MethodButton(*method)))
        .collect();
    assert_eq!(visible, vec![VerificationMethod::StandardJsonInput]);
}

#[tokio::test]
async fn default_method_is_selected_after_layout() {
    let dom = RefCell::new(HeadlessDom::choose_type_page());
    VerificationTypeSelector::select_default_after_layout(&dom).await;
    assert_eq!(
        VerificationTypeSelector::selected(&*dom.borrow()),
        Some(VerificationMethod::FlattenedCode)
    );
}

#[test]
fn toggles_show_dependent_inputs() {
    let mut dom = HeadlessDom::verification_page(3);
    assert!(!dom.is_visible(Region::OptimizationRuns));

    FormToggles::optimization(&mut dom, true);
    assert!(dom.is_visible(Region::OptimizationRuns));
    FormToggles::optimization(&mut dom, false);
    assert!(!dom.is_visible(Region::OptimizationRuns));

    FormToggles::autodetect(&mut dom, true);
    assert!(!dom.is_visible(Region::ConstructorArguments));
    FormToggles::autodetect(&mut dom, false);
    assert!(dom.is_visible(Region::ConstructorArguments));
}

#[test]
fn library_groups_are_revealed_one_at_a_time() {
    let mut dom = HeadlessDom::verification_page(3);
    LibraryPanel::open(&mut dom);
    assert!(dom.is_visible(Region::LibrariesWrapper));
    assert!(!dom.is_visible(Region::AddLibrariesButton));
    assert_eq!(LibraryPanel::active_count(&dom), 1);

    LibraryPanel::add_library(&mut dom);
    assert_eq!(LibraryPanel::active_count(&dom), 2);
    assert!(dom.is_visible(Region::AddLibraryWrapper));

    LibraryPanel::add_library(&mut dom);
    assert_eq!(LibraryPanel::active_count(&dom), 3);
    assert!(!dom.is_visible(Region::AddLibraryWrapper));

    LibraryPanel::add_library(&mut dom);
    assert_eq!(LibraryPanel::active_count(&dom), 3);

    LibraryPanel::reset(&mut dom);
    assert_eq!(LibraryPanel::active_count(&dom), 1);
    assert!(dom.has_class(Region::LibraryGroup(0), ACTIVE_CLASS));
    assert!(!dom.is_visible(Region::LibrariesWrapper));
    assert!(dom.is_visible(Region::AddLibrariesButton));
    assert!(dom.is_visible(Region::AddLibraryWrapper));
}

#[test]
fn form_behaviors_are_bound_together() {
    let mut dom = HeadlessDom::verification_page(1);
    attach_form_behaviors(&mut dom);
    assert!(dom.is_bound(Behavior::LoadingAnimation));
    assert!(dom.is_bound(Behavior::Libraries));
    assert!(dom.is_bound(Behavior::Toggles));
    assert!(!dom.is_bound(Behavior::Upload));
}
