//! Admin notices
//!
//! Handlers record outcomes here; the host drains and renders them in
//! whatever notice area it owns.

use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// One notice destined for the host's settings screen
#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,

    /// Settings slot the notice belongs to, `<prefix>_support` by default
    pub setting: String,

    pub message: String,

    /// CSS class hook, `<prefix>-notice`
    pub css_class: String,
}

/// Collected notices for the current request
pub struct NoticeLog {
    setting: String,
    css_class: String,
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new(prefix: &str) -> Self {
        Self {
            setting: format!("{prefix}_support"),
            css_class: format!("{prefix}-notice"),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message.into());
    }

    fn push(&self, kind: NoticeKind, message: String) {
        self.notices.lock().unwrap().push(Notice {
            kind,
            setting: self.setting.clone(),
            message,
            css_class: self.css_class.clone(),
        });
    }

    /// Take all collected notices, leaving the log empty
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap())
    }

    #[cfg(test)]
    pub fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_carry_prefix_scoped_setting() {
        let log = NoticeLog::new("example_plugin");
        log.success("activated");
        log.error("failed");

        let notices = log.drain();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].kind, NoticeKind::Success);
        assert_eq!(notices[0].setting, "example_plugin_support");
        assert_eq!(notices[1].css_class, "example_plugin-notice");

        assert!(log.drain().is_empty());
    }
}
