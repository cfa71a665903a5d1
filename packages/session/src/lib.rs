#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Client-local admin session gate.
//!
//! This is a UI affordance, not an authentication system: the password
//! is a plaintext constant compared in the client, the flag lives in the
//! local preference store, and anyone with access to that store can set
//! it. It only decides whether destructive controls are *rendered*. The
//! server must authorize privileged requests independently; nothing in
//! this crate may ever be treated as proof of authority.

use chrono::Utc;
use incident_map_prefs::{PrefsStore, keys};

/// The admin password constant. Client-side only, by design.
const ADMIN_PASSWORD: &str = "canmore";

/// Session lifetime: 10 minutes.
pub const SESSION_DURATION_MS: i64 = 600_000;

/// How often the expiry check runs.
pub const EXPIRY_CHECK_INTERVAL_SECS: u64 = 60;

/// How often the countdown display updates.
pub const TIMER_TICK_SECS: u64 = 1;

/// Result of a periodic expiry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryCheck {
    /// Not logged in; nothing to expire.
    LoggedOut,
    /// Logged in with time remaining.
    Active,
    /// The 10-minute window elapsed; the session was just cleared.
    Expired,
}

/// The client's admin session state.
///
/// At most one session exists per preference store (per browser profile
/// in the original). All mutations write through to the store so the
/// state survives a restart.
#[derive(Debug, Clone, Default)]
pub struct AdminSession {
    login_time_ms: Option<i64>,
}

impl AdminSession {
    /// Restores the session from the preference store.
    ///
    /// A stored flag with a missing, unparsable, or already-elapsed
    /// login time downgrades to logged-out immediately, clearing the
    /// stale keys.
    #[must_use]
    pub fn restore(prefs: &mut PrefsStore, now_ms: i64) -> Self {
        if !prefs.get_bool(keys::IS_ADMIN) {
            return Self::default();
        }
        let login_time_ms = prefs
            .get(keys::ADMIN_LOGIN_TIME)
            .and_then(|raw| raw.parse::<i64>().ok());
        match login_time_ms {
            Some(t) if now_ms - t <= SESSION_DURATION_MS => Self {
                login_time_ms: Some(t),
            },
            _ => {
                log::info!("Stored admin session expired, downgrading");
                let mut session = Self::default();
                session.logout(prefs);
                session
            },
        }
    }

    /// Attempts to enable admin mode.
    ///
    /// The correct password sets the flag and records the login time;
    /// any other input leaves the session untouched.
    pub fn login(&mut self, prefs: &mut PrefsStore, password: &str, now_ms: i64) -> bool {
        if password != ADMIN_PASSWORD {
            log::warn!("Admin login rejected: wrong password");
            return false;
        }
        self.login_time_ms = Some(now_ms);
        prefs.set_bool(keys::IS_ADMIN, true);
        prefs.set(keys::ADMIN_LOGIN_TIME, now_ms.to_string());
        log::info!("Admin mode enabled for {} minutes", SESSION_DURATION_MS / 60_000);
        true
    }

    /// Disables admin mode and clears the stored keys.
    pub fn logout(&mut self, prefs: &mut PrefsStore) {
        self.login_time_ms = None;
        prefs.remove(keys::IS_ADMIN);
        prefs.remove(keys::ADMIN_LOGIN_TIME);
    }

    /// Whether admin controls should currently be rendered.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.login_time_ms.is_some()
    }

    /// Milliseconds left in the session window, floored at zero.
    /// `None` when logged out.
    #[must_use]
    pub fn remaining_ms(&self, now_ms: i64) -> Option<i64> {
        self.login_time_ms
            .map(|t| (SESSION_DURATION_MS - (now_ms - t)).max(0))
    }

    /// Countdown text for the timer display, e.g. `"9m 05s"`.
    #[must_use]
    pub fn format_remaining(&self, now_ms: i64) -> Option<String> {
        self.remaining_ms(now_ms).map(|ms| {
            let minutes = ms / 60_000;
            let seconds = (ms % 60_000) / 1000;
            format!("{minutes}m {seconds:02}s")
        })
    }

    /// Periodic expiry check. Once [`SESSION_DURATION_MS`] have elapsed
    /// since login, clears the session and reports [`ExpiryCheck::Expired`].
    pub fn check_expiry(&mut self, prefs: &mut PrefsStore, now_ms: i64) -> ExpiryCheck {
        match self.login_time_ms {
            None => ExpiryCheck::LoggedOut,
            Some(t) if now_ms - t > SESSION_DURATION_MS => {
                log::info!("Admin session expired");
                self.logout(prefs);
                ExpiryCheck::Expired
            },
            Some(_) => ExpiryCheck::Active,
        }
    }
}

/// Current wall-clock time in milliseconds since the epoch.
#[must_use]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
