//! What the client asks its front end to do.
//!
//! Components never touch a screen; they emit [`UiEffect`]s into a
//! [`UiSink`] and whichever front end owns the receiver renders them.

use tokio::sync::mpsc;

use crate::anomaly_service::AnomalyReport;
use crate::router::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Pending,
    Success,
    Error,
}

/// Which status line a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTarget {
    Session,
    CheckIn,
    Anomaly,
    General,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    Navigate(Page),
    LoginStatus(String),
    ShowSignInForm,
    ShowDashboard,
    Status {
        target: StatusTarget,
        level: Level,
        message: String,
    },
    StartScanner,
    StopScanner,
    /// Replaces any QR code currently on screen.
    RenderQr(String),
    ShowUnauthorized(String),
    AnomalyReport(AnomalyReport),
    Alert(String),
}

#[derive(Clone)]
pub struct UiSink {
    tx: mpsc::UnboundedSender<UiEffect>,
}

impl UiSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEffect>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, effect: UiEffect) {
        if self.tx.send(effect).is_err() {
            tracing::debug!("ui receiver dropped, effect discarded");
        }
    }

    pub fn status(&self, target: StatusTarget, level: Level, message: impl Into<String>) {
        self.emit(UiEffect::Status {
            target,
            level,
            message: message.into(),
        });
    }

    pub fn alert(&self, message: impl Into<String>) {
        self.emit(UiEffect::Alert(message.into()));
    }
}
