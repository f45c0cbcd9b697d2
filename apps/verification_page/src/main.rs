use std::{cell::RefCell, path::PathBuf, rc::Rc};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use client_core::{load_file, ChannelClient, HttpUploadSubmitter, PhoenixSocket};
use shared::domain::{AddressHash, UploadMode};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use verification_page::{
    config::{load_settings, DEFAULT_CONFIG_FILE},
    dom::HeadlessDom,
    navigation::HeadlessNavigator,
    params::PageParams,
    ChooseTypePage, Control, PageKind, VerificationPage,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Standard,
    Metadata,
}

impl From<ModeArg> for UploadMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Standard => UploadMode::Standard,
            ModeArg::Metadata => UploadMode::Metadata,
        }
    }
}

/// Headless driver for the contract verification page.
#[derive(Parser, Debug)]
struct Args {
    /// Full URL of the page being driven; its query carries the page context.
    #[arg(long)]
    page_url: String,
    #[arg(long)]
    address_hash: String,
    #[arg(long, value_enum, default_value = "metadata")]
    mode: ModeArg,
    /// Drive the method chooser instead of the verification form.
    #[arg(long)]
    choose_type: bool,
    #[arg(long, default_value_t = 10)]
    library_groups: usize,
    /// File to stage; repeatable.
    #[arg(long = "file")]
    files: Vec<PathBuf>,
    #[arg(long)]
    submit: bool,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides the explorer base URL from config.
    #[arg(long)]
    explorer_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(explorer_url) = args.explorer_url.clone() {
        settings.explorer_url = explorer_url;
    }

    let kind = if args.choose_type {
        PageKind::ChooseType
    } else {
        PageKind::Verification {
            mode: args.mode.into(),
        }
    };

    match kind {
        PageKind::ChooseType => {
            let page = ChooseTypePage::new(Rc::new(RefCell::new(HeadlessDom::choose_type_page())));
            page.enter().await;
            info!(selected = ?page.selected(), "choose-type page ready");
            Ok(())
        }
        PageKind::Verification { mode } => run_verification(args, settings, mode).await,
    }
}

async fn run_verification(
    args: Args,
    settings: verification_page::config::Settings,
    mode: UploadMode,
) -> Result<()> {
    let params = PageParams::from_url(&args.page_url)?;
    let dom = Rc::new(RefCell::new(HeadlessDom::verification_page(args.library_groups)));
    let navigator = HeadlessNavigator::default();
    let (outcome_tx, mut outcomes) = mpsc::unbounded_channel();
    let submitter = HttpUploadSubmitter::new(settings.upload_endpoint(), outcome_tx);

    let mut page = VerificationPage::load(
        &params,
        AddressHash::new(args.address_hash.clone()),
        mode,
        dom,
        navigator.clone(),
        Box::new(submitter),
    );

    let socket_url = settings.socket_url()?;
    let (socket, mut events) = PhoenixSocket::connect(&socket_url, settings.heartbeat())
        .await
        .with_context(|| format!("failed to open verification channel at {socket_url}"))?;
    let client = ChannelClient::new(socket);
    let subscription = page.subscribe(&client).await?;

    for path in &args.files {
        let file = load_file(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        if let Err(rejection) = page.add_file(file) {
            warn!(file = %path.display(), %rejection, "file not staged");
        }
    }
    info!(
        queued = page.queue_length(),
        submit_enabled = page.submit_enabled(),
        "upload queue ready"
    );

    if args.submit {
        page.handle_control(Control::Submit(mode));
    }

    let mut channel_open = true;
    while !page.navigated() {
        tokio::select! {
            event = events.recv(), if channel_open => match event {
                Some(event) => page.handle_transport_event(&subscription, event),
                None => channel_open = false,
            },
            Some(outcome) = outcomes.recv() => page.submission_finished(&outcome),
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    if let Some(url) = navigator.visited().last() {
        info!(url = %url, "verification finished");
    }
    Ok(())
}
