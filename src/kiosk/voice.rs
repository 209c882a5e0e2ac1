//! Voice loop: wake phrase, follow-up command, feedback border.
//!
//! ```text
//!        ┌──────────── not a wake phrase / timeout / unintelligible ─────┐
//!        ▼                                                              │
//!  listen(wake_timeout) ──wake phrase──▶ flash Hotword ──▶ listen(command_timeout)
//!                                                             │
//!             ┌───────────────────────────────────────────────┤
//!             ▼                                               ▼
//!   dispatch ─ None ─────────────▶ flash Fail           Err ─▶ flash Fail
//!       └── Some(cmd) ─ apply ─┬─ Applied  ─▶ flash Success
//!                              ├─ Rejected ─▶ flash Fail
//!                              └─ Shutdown ─▶ flash Success + request shutdown
//! ```
//!
//! Each blocking listen runs on `spawn_blocking` and is raced against the
//! shutdown signal, so the loop exits as soon as shutdown is requested.  The
//! abandoned blocking call finishes its bounded wait in the background.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::command::CommandDispatcher;
use crate::config::VoiceConfig;
use crate::overlay::BorderKind;
use crate::stt::{ListenError, SpeechListener};

use super::shutdown::{ShutdownReason, ShutdownSignal};
use super::state::{lock_kiosk, CommandOutcome, SharedKiosk};

/// Pause after a service error so a missing microphone does not spin.
const SERVICE_BACKOFF: Duration = Duration::from_secs(2);

pub struct VoiceLoop {
    kiosk: SharedKiosk,
    listener: Arc<dyn SpeechListener>,
    dispatcher: CommandDispatcher,
    wake_words: Vec<String>,
    wake_timeout: Duration,
    command_timeout: Duration,
    phrase_limit: Duration,
    service_backoff: Duration,
    shutdown: ShutdownSignal,
}

impl VoiceLoop {
    pub fn new(
        kiosk: SharedKiosk,
        listener: Arc<dyn SpeechListener>,
        cfg: &VoiceConfig,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            kiosk,
            listener,
            dispatcher: CommandDispatcher::new(cfg.match_threshold),
            wake_words: cfg.wake_words.iter().map(|w| normalize_words(w)).collect(),
            wake_timeout: Duration::from_secs(cfg.wake_timeout_secs),
            command_timeout: Duration::from_secs(cfg.command_timeout_secs),
            phrase_limit: Duration::from_secs(cfg.phrase_limit_secs),
            service_backoff: SERVICE_BACKOFF,
            shutdown,
        }
    }

    #[cfg(test)]
    fn with_service_backoff(mut self, backoff: Duration) -> Self {
        self.service_backoff = backoff;
        self
    }

    /// Run until shutdown is requested.
    pub async fn run(self) {
        log::info!("voice: listening for wake phrase");

        loop {
            let Some(heard) = self.listen(self.wake_timeout).await else {
                break;
            };
            match heard {
                Ok(text) if self.is_wake_phrase(&text) => {
                    log::info!("voice: wake phrase heard ({text:?})");
                }
                Ok(text) => {
                    log::debug!("voice: ignoring {text:?}");
                    continue;
                }
                Err(ListenError::Service(e)) => {
                    log::warn!("voice: {e}");
                    if !self.back_off().await {
                        break;
                    }
                    continue;
                }
                Err(_) => continue,
            }

            self.flash(BorderKind::Hotword);

            let Some(reply) = self.listen(self.command_timeout).await else {
                break;
            };
            match reply {
                Ok(text) => self.handle_command(&text),
                Err(e) => {
                    log::info!("voice: no command: {e}");
                    self.flash(BorderKind::Fail);
                }
            }

            if self.shutdown.is_requested() {
                break;
            }
        }

        log::info!("voice: loop stopped");
    }

    /// `None` when shutdown won the race.
    async fn listen(&self, timeout: Duration) -> Option<Result<String, ListenError>> {
        let listener = Arc::clone(&self.listener);
        let phrase_limit = self.phrase_limit;
        let call = tokio::task::spawn_blocking(move || listener.listen(timeout, phrase_limit));

        tokio::select! {
            biased;
            _ = self.shutdown.requested() => None,
            joined = call => Some(joined.unwrap_or_else(|e| {
                Err(ListenError::Service(format!("listener task failed: {e}")))
            })),
        }
    }

    /// Sleep for the backoff.  `false` if shutdown arrived meanwhile.
    async fn back_off(&self) -> bool {
        tokio::select! {
            _ = self.shutdown.requested() => false,
            _ = tokio::time::sleep(self.service_backoff) => true,
        }
    }

    fn is_wake_phrase(&self, text: &str) -> bool {
        let text = normalize_words(text);
        self.wake_words
            .iter()
            .any(|w| !w.is_empty() && text.contains(w.as_str()))
    }

    fn handle_command(&self, text: &str) {
        let now = Instant::now();
        let mut kiosk = lock_kiosk(&self.kiosk);

        let Some(command) = self.dispatcher.dispatch(text) else {
            log::info!("voice: unrecognised command {text:?}");
            kiosk.flash(BorderKind::Fail, now);
            return;
        };

        log::info!("voice: {text:?} → {command:?}");
        match kiosk.apply(command, now) {
            CommandOutcome::Applied => kiosk.flash(BorderKind::Success, now),
            CommandOutcome::Rejected(_) => kiosk.flash(BorderKind::Fail, now),
            CommandOutcome::Shutdown => {
                kiosk.flash(BorderKind::Success, now);
                drop(kiosk);
                self.shutdown.request(ShutdownReason::VoiceCommand);
            }
        }
    }

    fn flash(&self, kind: BorderKind) {
        lock_kiosk(&self.kiosk).flash(kind, Instant::now());
    }
}

/// Lowercase, punctuation to spaces, single-spaced: `"Hey, Berry."` → `"hey berry"`.
fn normalize_words(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::AppConfig;
    use crate::kiosk::Kiosk;
    use crate::library::{MockFavorites, MockLibrary};
    use crate::playback::{ItemId, PlaylistMode};
    use crate::stt::ScriptedListener;

    const RUN_LIMIT: Duration = Duration::from_secs(5);

    fn kiosk(names: &[&str]) -> SharedKiosk {
        Kiosk::new(
            Box::new(MockLibrary::with(names)),
            Box::new(MockFavorites::default()),
            &AppConfig::default(),
            Instant::now(),
        )
        .into_shared()
    }

    /// Run the loop over `script`; it stops once the script is exhausted.
    async fn run_script(
        kiosk: &SharedKiosk,
        script: Vec<Result<String, ListenError>>,
    ) -> ShutdownSignal {
        let shutdown = ShutdownSignal::new();
        let listener = ScriptedListener::new(script).then_shutdown(shutdown.clone());
        let voice = VoiceLoop::new(
            kiosk.clone(),
            Arc::new(listener),
            &AppConfig::default().voice,
            shutdown.clone(),
        )
        .with_service_backoff(Duration::from_millis(10));

        tokio::time::timeout(RUN_LIMIT, voice.run())
            .await
            .expect("voice loop finished");
        shutdown
    }

    fn ok(s: &str) -> Result<String, ListenError> {
        Ok(s.to_string())
    }

    #[tokio::test]
    async fn wake_then_command_applies_and_flashes_success() {
        let k = kiosk(&["A", "B", "C"]);

        run_script(&k, vec![ok("Hey Berry"), ok("nächstes bild")]).await;

        let guard = lock_kiosk(&k);
        assert_eq!(guard.playback().current(), Some(&ItemId::from("B")));
        assert_eq!(guard.overlay().border(Instant::now()), Some(BorderKind::Success));
    }

    #[tokio::test]
    async fn command_without_wake_phrase_is_ignored() {
        let k = kiosk(&["A", "B"]);

        run_script(&k, vec![ok("nächstes bild")]).await;

        let guard = lock_kiosk(&k);
        assert_eq!(guard.playback().index(), 0);
        assert_eq!(guard.overlay().border(Instant::now()), None);
    }

    #[tokio::test]
    async fn nonsense_arms_fail_border_for_one_second() {
        let k = kiosk(&["A", "B"]);

        run_script(&k, vec![ok("hey berry"), ok("xyzzy nonsense")]).await;

        let guard = lock_kiosk(&k);
        let now = Instant::now();
        assert_eq!(guard.overlay().border(now), Some(BorderKind::Fail));
        assert_eq!(guard.overlay().border(now + Duration::from_secs(1)), None);
        assert_eq!(guard.playback().index(), 0);
    }

    #[tokio::test]
    async fn unintelligible_command_flashes_fail() {
        let k = kiosk(&["A"]);

        run_script(&k, vec![ok("hey berry"), Err(ListenError::Unintelligible)]).await;

        assert_eq!(
            lock_kiosk(&k).overlay().border(Instant::now()),
            Some(BorderKind::Fail)
        );
    }

    #[tokio::test]
    async fn failed_wake_listen_is_silent() {
        let k = kiosk(&["A"]);

        run_script(
            &k,
            vec![
                Err(ListenError::Unintelligible),
                Err(ListenError::Timeout),
                Err(ListenError::Service("no mic".into())),
            ],
        )
        .await;

        assert_eq!(lock_kiosk(&k).overlay().border(Instant::now()), None);
    }

    #[tokio::test]
    async fn rejected_command_flashes_fail() {
        let k = kiosk(&["A"]);

        run_script(&k, vec![ok("hey berry"), ok("spiele favoriten ab")]).await;

        let guard = lock_kiosk(&k);
        assert_eq!(guard.playback().mode(), PlaylistMode::All);
        assert_eq!(guard.overlay().border(Instant::now()), Some(BorderKind::Fail));
    }

    #[tokio::test]
    async fn go_to_by_voice() {
        let k = kiosk(&["A", "B", "C"]);

        run_script(&k, vec![ok("hey barry"), ok("Gehe zu Bild 3")]).await;

        assert_eq!(lock_kiosk(&k).playback().index(), 2);
    }

    #[tokio::test]
    async fn several_commands_in_sequence() {
        let k = kiosk(&["A", "B", "C"]);

        run_script(
            &k,
            vec![
                ok("hey berry"),
                ok("stopp"),
                ok("hibery"),
                ok("langsamer"),
                ok("hey bery"),
                ok("speichern als favorit"),
            ],
        )
        .await;

        let guard = lock_kiosk(&k);
        assert!(guard.playback().is_paused());
        assert_eq!(guard.playback().interval_secs(), 11);
        assert_eq!(guard.playback().favorites(), &[ItemId::from("A")]);
    }

    #[tokio::test]
    async fn shutdown_command_requests_voice_shutdown() {
        let k = kiosk(&["A"]);

        let shutdown = run_script(&k, vec![ok("hey berry"), ok("ausschalten"), ok("hey berry")]).await;

        assert_eq!(shutdown.reason(), Some(ShutdownReason::VoiceCommand));
    }

    #[tokio::test]
    async fn loop_exits_promptly_when_shutdown_requested() {
        struct Slow;
        impl SpeechListener for Slow {
            fn listen(&self, _: Duration, _: Duration) -> Result<String, ListenError> {
                std::thread::sleep(Duration::from_millis(300));
                Err(ListenError::Timeout)
            }
        }

        let shutdown = ShutdownSignal::new();
        let voice = VoiceLoop::new(
            kiosk(&["A"]),
            Arc::new(Slow),
            &AppConfig::default().voice,
            shutdown.clone(),
        );
        let handle = tokio::spawn(voice.run());
        tokio::time::sleep(Duration::from_millis(20)).await;

        let started = Instant::now();
        shutdown.request(ShutdownReason::Signal);
        tokio::time::timeout(Duration::from_millis(200), handle)
            .await
            .expect("loop stopped before the listen call returned")
            .expect("task joined");
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[test]
    fn wake_phrase_is_a_case_insensitive_substring() {
        let voice = VoiceLoop::new(
            kiosk(&[]),
            Arc::new(ScriptedListener::phrases(&[])),
            &AppConfig::default().voice,
            ShutdownSignal::new(),
        );
        assert!(voice.is_wake_phrase("Hey Berry!"));
        assert!(voice.is_wake_phrase("ähm hey baby"));
        assert!(voice.is_wake_phrase("Hey, Berry."));
        assert!(voice.is_wake_phrase("HEY  -  barry?"));
        assert!(!voice.is_wake_phrase("hallo"));
        assert!(!voice.is_wake_phrase("..."));
    }
}
