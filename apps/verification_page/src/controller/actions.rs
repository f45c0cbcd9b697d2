use shared::{domain::AddressHash, protocol::VerificationMessage};

/// Context captured from the page once, at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLoad {
    pub address_hash: AddressHash,
    pub filter: Option<String>,
    pub beyond_page_one: bool,
}

/// Fields an optional, late-initialized UI region may contribute. Only
/// fields that are `Some` are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementFields {
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PageLoad(PageLoad),
    ElementsLoad(ElementFields),
    ChannelDisconnected,
    VerificationResult(VerificationMessage),
    /// The browser started leaving the page.
    NavigationStarted,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PageLoad(_) => "page_load",
            Self::ElementsLoad(_) => "elements_load",
            Self::ChannelDisconnected => "channel_disconnected",
            Self::VerificationResult(_) => "verification_result",
            Self::NavigationStarted => "navigation_started",
        }
    }
}
