// src/handlers/wizard.rs
//! Interactive capture of URLs for urls.json.
//!
//! The operator picks a scope, then an action, then enters URLs until they
//! execute or cancel. Nothing reaches the store before execute, and cancel at
//! any step drops everything collected so far.

use log::{debug, error, info};
use std::collections::BTreeSet;

use crate::config::{Action, StoreConfig};
use crate::error::AnalysisError;
use crate::models::Scope;
use crate::services::listing::validate_listing_url;
use crate::services::url_store::{UrlWriteReport, UrlWriter};

const CANCEL: &str = "c";
const NOTHING_WRITTEN: &str = "the URL file is missing or unreadable, nothing to change";
const EXECUTE: &str = "e";

/// Messages the wizard asks its input source to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Caption {
    ChooseScope,
    ChooseAction,
    EnterUrl { action: Action, another: bool },
    InvalidUrl,
    UrlReceived,
    IgnoredUrls(Vec<String>),
    Committed,
    NotCommitted(String),
    Cancelled,
}

/// Where the wizard gets operator input from.
pub trait UserInputSource {
    /// Shows `caption` and returns the next line, or `None` once input is exhausted.
    fn prompt(&mut self, caption: &Caption) -> Option<String>;
    fn notify(&mut self, caption: &Caption);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    SelectScope,
    SelectAction,
    CollectUrls,
    Commit,
    Cancelled,
}

/// Choices and URLs gathered so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardContext {
    pub scope: Option<Scope>,
    pub action: Option<Action>,
    pub urls: BTreeSet<String>,
}

impl WizardContext {
    fn clear(&mut self) {
        self.scope = None;
        self.action = None;
        self.urls.clear();
    }
}

#[derive(Debug)]
pub enum WizardOutcome {
    Committed {
        config: StoreConfig,
        urls: BTreeSet<String>,
        report: UrlWriteReport,
    },
    NotCommitted {
        config: StoreConfig,
        urls: BTreeSet<String>,
        reason: AnalysisError,
    },
    /// The store accepted the request but had nothing to change, e.g. a
    /// delete against a missing or unreadable urls.json.
    Unchanged {
        config: StoreConfig,
        urls: BTreeSet<String>,
    },
    Cancelled,
}

pub struct UrlCaptureWizard<'a, I: UserInputSource, W: UrlWriter> {
    input: &'a mut I,
    writer: &'a W,
    state: WizardState,
    context: WizardContext,
}

impl<'a, I: UserInputSource, W: UrlWriter> UrlCaptureWizard<'a, I, W> {
    pub fn new(input: &'a mut I, writer: &'a W) -> Self {
        UrlCaptureWizard {
            input,
            writer,
            state: WizardState::SelectScope,
            context: WizardContext::default(),
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    /// Drives the state machine until it reaches `Commit` or `Cancelled`.
    /// A wizard that already finished reports `Cancelled` without prompting.
    pub fn run(&mut self) -> WizardOutcome {
        loop {
            debug!("Wizard state: {:?}", self.state);
            let outcome = match self.state {
                WizardState::SelectScope => self.select_scope(),
                WizardState::SelectAction => self.select_action(),
                WizardState::CollectUrls => self.collect_url(),
                WizardState::Commit | WizardState::Cancelled => Some(WizardOutcome::Cancelled),
            };
            if let Some(outcome) = outcome {
                return outcome;
            }
        }
    }

    /// End of input reads as cancel.
    fn read(&mut self, caption: &Caption) -> String {
        self.input
            .prompt(caption)
            .map(|line| line.trim().to_string())
            .unwrap_or_else(|| CANCEL.to_string())
    }

    fn select_scope(&mut self) -> Option<WizardOutcome> {
        match self.read(&Caption::ChooseScope).as_str() {
            "s" => self.context.scope = Some(Scope::Search),
            "p" => self.context.scope = Some(Scope::Property),
            CANCEL => return Some(self.cancel()),
            _ => return None,
        }
        self.state = WizardState::SelectAction;
        None
    }

    fn select_action(&mut self) -> Option<WizardOutcome> {
        match self.read(&Caption::ChooseAction).as_str() {
            "a" => self.context.action = Some(Action::Append),
            "o" => self.context.action = Some(Action::Overwrite),
            "d" => self.context.action = Some(Action::Delete),
            CANCEL => return Some(self.cancel()),
            _ => return None,
        }
        self.state = WizardState::CollectUrls;
        None
    }

    fn collect_url(&mut self) -> Option<WizardOutcome> {
        let (scope, action) = match (self.context.scope, self.context.action) {
            (Some(scope), Some(action)) => (scope, action),
            _ => return Some(self.cancel()),
        };
        let another = !self.context.urls.is_empty();
        let line = self.read(&Caption::EnterUrl { action, another });

        if line == CANCEL {
            return Some(self.cancel());
        }
        if line == EXECUTE && another {
            return Some(self.execute(StoreConfig::new(scope, action)));
        }

        match validate_listing_url(&line, scope) {
            Ok(()) => {
                self.context.urls.insert(line);
                self.input.notify(&Caption::UrlReceived);
            }
            Err(e) => {
                debug!("{}", e);
                self.input.notify(&Caption::InvalidUrl);
            }
        }
        None
    }

    fn execute(&mut self, config: StoreConfig) -> WizardOutcome {
        self.state = WizardState::Commit;
        let urls = self.context.urls.clone();

        match self.writer.write_urls(&urls, config) {
            Ok(report) if !report.written => {
                info!("URL store left unchanged for {:?}", config);
                self.input.notify(&Caption::NotCommitted(NOTHING_WRITTEN.to_string()));
                WizardOutcome::Unchanged { config, urls }
            }
            Ok(report) => {
                if !report.ignored.is_empty() {
                    self.input.notify(&Caption::IgnoredUrls(report.ignored.clone()));
                }
                info!("Committed {} URL(s) with {:?}", urls.len(), config);
                self.input.notify(&Caption::Committed);
                WizardOutcome::Committed { config, urls, report }
            }
            Err(reason) => {
                error!("URL store write failed: {}", reason);
                self.input.notify(&Caption::NotCommitted(reason.to_string()));
                WizardOutcome::NotCommitted { config, urls, reason }
            }
        }
    }

    fn cancel(&mut self) -> WizardOutcome {
        self.context.clear();
        self.state = WizardState::Cancelled;
        info!("URL capture cancelled; nothing written");
        self.input.notify(&Caption::Cancelled);
        WizardOutcome::Cancelled
    }
}
