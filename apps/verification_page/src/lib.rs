//! Client-side orchestration of the contract source verification page.
//!
//! A [`controller::StateStore`] owns the session and reduces actions coming
//! from page load, the real-time channel and the browser. The
//! [`binder::ElementBinder`] re-renders page regions after each transition,
//! while the [`stager::UploadStager`] keeps its own file queue and gates the
//! submit buttons.

pub mod binder;
pub mod config;
pub mod controller;
pub mod dom;
pub mod navigation;
pub mod page;
pub mod params;
pub mod selector;
pub mod stager;

pub use page::{ChooseTypePage, Control, PageKind, VerificationPage};
