//! The page's DOM, seen through the handful of regions this workflow touches.
//!
//! Rendering of server markup and the widget internals stay outside this
//! crate; [`PageDom`] is the seam. [`HeadlessDom`] is an in-memory
//! implementation used by the headless runner and the tests.

use std::{
    borrow::Cow,
    collections::{BTreeSet, HashMap, HashSet},
};

use shared::domain::{UploadMode, VerificationMethod};

pub const HIDDEN_CLASS: &str = "d-none";
pub const ACTIVE_CLASS: &str = "active";
pub const QUEUE_STARTED_CLASS: &str = "dz-started";
pub const CLICKABLE_CLASS: &str = "dz-clickable";
const LIBRARY_GROUP_CLASS: &str = "js-contract-library-form-group";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    DisconnectBanner,
    VerificationForm,
    LoadingIndicator,
    FileHelpBlock,
    StandardDropzone,
    StandardPreviews,
    MetadataDropzone,
    StandardSubmit,
    MetadataSubmit,
    AddLibrariesButton,
    LibrariesWrapper,
    AddLibraryWrapper,
    LibraryGroup(usize),
    OptimizationRuns,
    ConstructorArguments,
    MethodButton(VerificationMethod),
}

impl Region {
    pub fn selector(self) -> Cow<'static, str> {
        match self {
            Self::DisconnectBanner => "[data-selector=\"channel-disconnected-message\"]".into(),
            Self::VerificationForm => "[data-page=\"contract-verification\"]".into(),
            Self::LoadingIndicator => "#loading".into(),
            Self::FileHelpBlock => "#file-help-block".into(),
            Self::StandardDropzone => "#json-dropzone-form".into(),
            Self::StandardPreviews => "#dropzone-previews".into(),
            Self::MetadataDropzone => "#metadata-json-dropzone".into(),
            Self::StandardSubmit => "#verify-via-standart-json-input-submit".into(),
            Self::MetadataSubmit => "#verify-via-json-submit".into(),
            Self::AddLibrariesButton => ".js-btn-add-contract-libraries".into(),
            Self::LibrariesWrapper => ".js-smart-contract-libraries-wrapper".into(),
            Self::AddLibraryWrapper => ".js-add-contract-library-wrapper".into(),
            Self::LibraryGroup(index) => {
                format!(".{LIBRARY_GROUP_CLASS}:eq({index})").into()
            }
            Self::OptimizationRuns => ".optimization-runs".into(),
            Self::ConstructorArguments => ".constructor-arguments".into(),
            Self::MethodButton(method) => match method {
                VerificationMethod::FlattenedCode => "#verify_via_flattened_code_button".into(),
                VerificationMethod::Sourcify => "#verify_via_sourcify_button".into(),
                VerificationMethod::VyperContract => "#verify_vyper_contract_button".into(),
                VerificationMethod::StandardJsonInput => "#verify_via_standard_json_input".into(),
            },
        }
    }

    /// Container the upload widget is mounted on.
    pub fn dropzone(mode: UploadMode) -> Self {
        match mode {
            UploadMode::Standard => Self::StandardDropzone,
            UploadMode::Metadata => Self::MetadataDropzone,
        }
    }

    /// Element carrying the "queue started" indicator.
    pub fn queue_indicator(mode: UploadMode) -> Self {
        match mode {
            UploadMode::Standard => Self::StandardPreviews,
            UploadMode::Metadata => Self::MetadataDropzone,
        }
    }

    pub fn submit_button(mode: UploadMode) -> Self {
        match mode {
            UploadMode::Standard => Self::StandardSubmit,
            UploadMode::Metadata => Self::MetadataSubmit,
        }
    }

    /// Regions that live inside the replaceable verification form.
    fn in_form(self) -> bool {
        !matches!(
            self,
            Self::DisconnectBanner
                | Self::VerificationForm
                | Self::LoadingIndicator
                | Self::MethodButton(_)
        )
    }
}

/// Event handlers attached to elements of the verification form. Replacing
/// the form drops all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    LoadingAnimation,
    Libraries,
    Toggles,
    Upload,
}

pub trait PageDom {
    fn set_visible(&mut self, region: Region, visible: bool);
    fn is_visible(&self, region: Region) -> bool;
    fn set_disabled(&mut self, region: Region, disabled: bool);
    fn is_disabled(&self, region: Region) -> bool;
    fn set_class(&mut self, region: Region, class: &str, present: bool);
    fn has_class(&self, region: Region, class: &str) -> bool;
    fn set_text(&mut self, region: Region, text: &str);
    fn text(&self, region: Region) -> String;
    /// Swaps `region` for server-rendered markup, destroying every
    /// [`Behavior`] bound inside it.
    fn replace_with(&mut self, region: Region, markup: &str);
    fn library_group_count(&self) -> usize;
    fn bind(&mut self, behavior: Behavior);
    fn is_bound(&self, behavior: Behavior) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ElementState {
    visible: bool,
    disabled: bool,
    classes: BTreeSet<String>,
    text: String,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            visible: true,
            disabled: false,
            classes: BTreeSet::new(),
            text: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessDom {
    elements: HashMap<Region, ElementState>,
    bound: HashSet<Behavior>,
    library_groups: usize,
    form_markup: Option<String>,
    replacements: usize,
}

impl HeadlessDom {
    /// The contract verification form as first served, with
    /// `library_groups` library inputs.
    pub fn verification_page(library_groups: usize) -> Self {
        let mut dom = Self {
            elements: HashMap::new(),
            bound: HashSet::new(),
            library_groups,
            form_markup: None,
            replacements: 0,
        };
        dom.set_visible(Region::DisconnectBanner, false);
        dom.set_class(Region::LoadingIndicator, HIDDEN_CLASS, true);
        dom.seed_form();
        dom
    }

    /// The verification method chooser: every method button starts hidden.
    pub fn choose_type_page() -> Self {
        let mut dom = Self {
            elements: HashMap::new(),
            bound: HashSet::new(),
            library_groups: 0,
            form_markup: None,
            replacements: 0,
        };
        for method in VerificationMethod::ALL {
            dom.set_visible(Region::MethodButton(method), false);
        }
        dom
    }

    pub fn form_markup(&self) -> Option<&str> {
        self.form_markup.as_deref()
    }

    pub fn replacements(&self) -> usize {
        self.replacements
    }

    fn seed_form(&mut self) {
        self.set_disabled(Region::StandardSubmit, true);
        self.set_disabled(Region::MetadataSubmit, true);
        self.set_class(Region::StandardDropzone, CLICKABLE_CLASS, true);
        self.set_class(Region::MetadataDropzone, CLICKABLE_CLASS, true);
        self.set_visible(Region::LibrariesWrapper, false);
        self.set_visible(Region::OptimizationRuns, false);
        if self.library_groups > 0 {
            self.set_class(Region::LibraryGroup(0), ACTIVE_CLASS, true);
        }
    }

    fn element(&self, region: Region) -> Cow<'_, ElementState> {
        match self.elements.get(&region) {
            Some(state) => Cow::Borrowed(state),
            None => Cow::Owned(ElementState::default()),
        }
    }
}

impl PageDom for HeadlessDom {
    fn set_visible(&mut self, region: Region, visible: bool) {
        self.elements.entry(region).or_default().visible = visible;
    }

    fn is_visible(&self, region: Region) -> bool {
        self.element(region).visible
    }

    fn set_disabled(&mut self, region: Region, disabled: bool) {
        self.elements.entry(region).or_default().disabled = disabled;
    }

    fn is_disabled(&self, region: Region) -> bool {
        self.element(region).disabled
    }

    fn set_class(&mut self, region: Region, class: &str, present: bool) {
        let classes = &mut self.elements.entry(region).or_default().classes;
        if present {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    fn has_class(&self, region: Region, class: &str) -> bool {
        self.element(region).classes.contains(class)
    }

    fn set_text(&mut self, region: Region, text: &str) {
        self.elements.entry(region).or_default().text = text.to_string();
    }

    fn text(&self, region: Region) -> String {
        self.element(region).text.clone()
    }

    fn replace_with(&mut self, region: Region, markup: &str) {
        if region == Region::VerificationForm {
            self.elements.retain(|region, _| !region.in_form());
            self.bound.clear();
            self.library_groups = markup.matches(LIBRARY_GROUP_CLASS).count();
            self.form_markup = Some(markup.to_string());
            self.seed_form();
        } else {
            self.elements.insert(region, ElementState::default());
        }
        self.replacements += 1;
    }

    fn library_group_count(&self) -> usize {
        self.library_groups
    }

    fn bind(&mut self, behavior: Behavior) {
        self.bound.insert(behavior);
    }

    fn is_bound(&self, behavior: Behavior) -> bool {
        self.bound.contains(&behavior)
    }
}
