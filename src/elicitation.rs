//! The progressive elicitation state machine.
//!
//! One controller owns one session: it drives the one-shot reveal turn,
//! then the workshop loop that fills a fixed number of object and color
//! slots from free-form user utterances. Item capture is local and
//! synchronous; only the narrative reply depends on the remote backend, so
//! a backend failure never loses elicited data.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::advisory::{self, Advisory};
use crate::arcana::ArcanaCard;
use crate::dialogue::{BackendError, Dialogue, DialogueRequest, Lang, Mode, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Reveal,
    Workshop,
    Complete,
}

/// Required item count per category. All counts are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElicitationTarget {
    objects: usize,
    colors: usize,
}

impl ElicitationTarget {
    pub fn new(objects: usize, colors: usize) -> Self {
        Self {
            objects: objects.max(1),
            colors: colors.max(1),
        }
    }

    pub fn objects(&self) -> usize {
        self.objects
    }

    pub fn colors(&self) -> usize {
        self.colors
    }

    pub fn total(&self) -> usize {
        self.objects + self.colors
    }
}

impl Default for ElicitationTarget {
    fn default() -> Self {
        Self::new(3, 2)
    }
}

/// Items accumulated so far, in elicitation order. Duplicate values are
/// permitted and count independently toward the target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collected {
    #[serde(default)]
    pub objects: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
}

impl Collected {
    pub fn meets(&self, target: &ElicitationTarget) -> bool {
        self.objects.len() >= target.objects && self.colors.len() >= target.colors
    }
}

/// Which category an utterance was filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Object,
    Color,
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("the reveal narrative was already issued")]
    RevealAlreadyIssued,

    #[error("the reveal narrative has not been issued yet")]
    RevealNotIssued,

    #[error("a reply is still pending for the previous utterance")]
    TurnInFlight,

    #[error("no utterance is awaiting a reply")]
    NoPendingTurn,

    #[error("the session is complete; no further items are accepted")]
    SessionComplete,

    #[error("operation is not valid in the {0:?} phase")]
    WrongPhase(Phase),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Outcome of one successful workshop turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub reply: String,
    pub slot: Slot,
    pub phase: Phase,
}

pub struct Elicitor {
    card: &'static ArcanaCard,
    target: ElicitationTarget,
    lang: Lang,
    user_label: String,
    phase: Phase,
    collected: Collected,
    history: Vec<Turn>,
    revealed: bool,
    pending_reply: bool,
}

impl Elicitor {
    pub fn new(
        card: &'static ArcanaCard,
        target: ElicitationTarget,
        user_label: String,
        lang: Lang,
    ) -> Self {
        Self {
            card,
            target,
            lang,
            user_label,
            phase: Phase::Reveal,
            collected: Collected::default(),
            history: Vec::new(),
            revealed: false,
            pending_reply: false,
        }
    }

    /// Rebuild a workshop-phase controller from a wire snapshot.
    ///
    /// The HTTP boundary is stateless; each request carries the collected
    /// items and turn history back to the server. `pending_reply` marks a
    /// retried turn whose utterance was already captured.
    pub fn resume(
        card: &'static ArcanaCard,
        target: ElicitationTarget,
        user_label: String,
        lang: Lang,
        collected: Collected,
        history: Vec<Turn>,
        pending_reply: bool,
    ) -> Self {
        let phase = if collected.meets(&target) && !pending_reply {
            Phase::Complete
        } else {
            Phase::Workshop
        };
        Self {
            card,
            target,
            lang,
            user_label,
            phase,
            collected,
            history,
            revealed: true,
            pending_reply,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn card(&self) -> &'static ArcanaCard {
        self.card
    }

    pub fn collected(&self) -> &Collected {
        &self.collected
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn reply_pending(&self) -> bool {
        self.pending_reply
    }

    /// Issue the one-shot reveal narrative.
    ///
    /// The returned text is opaque; it is never parsed for items and never
    /// enters the turn history. A failed call may simply be reissued.
    pub async fn reveal(&mut self, backend: &dyn Dialogue) -> Result<String, TurnError> {
        if self.phase != Phase::Reveal {
            return Err(TurnError::WrongPhase(self.phase));
        }
        if self.revealed {
            return Err(TurnError::RevealAlreadyIssued);
        }

        let request = DialogueRequest {
            mode: Mode::Reveal,
            card: self.card,
            user_label: &self.user_label,
            lang: self.lang,
            target: self.target,
            collected: &self.collected,
            history: &[],
        };
        let narrative = backend.converse(&request).await?;
        self.revealed = true;
        Ok(narrative)
    }

    /// External signal that the user has acknowledged the narrative.
    /// The controller never advances out of the reveal phase on its own.
    pub fn acknowledge(&mut self) -> Result<(), TurnError> {
        if self.phase != Phase::Reveal {
            return Err(TurnError::WrongPhase(self.phase));
        }
        if !self.revealed {
            return Err(TurnError::RevealNotIssued);
        }
        self.phase = Phase::Workshop;
        Ok(())
    }

    /// File a user utterance into the first category still under target.
    ///
    /// The append is unconditional and happens before any backend call;
    /// category assignment is slot-order-driven, never content-driven.
    pub fn capture(&mut self, utterance: &str) -> Result<Slot, TurnError> {
        match self.phase {
            Phase::Reveal => return Err(TurnError::WrongPhase(Phase::Reveal)),
            Phase::Complete => return Err(TurnError::SessionComplete),
            Phase::Workshop => {}
        }
        if self.pending_reply {
            return Err(TurnError::TurnInFlight);
        }

        let slot = if self.collected.objects.len() < self.target.objects {
            self.collected.objects.push(utterance.to_string());
            Slot::Object
        } else {
            self.collected.colors.push(utterance.to_string());
            Slot::Color
        };
        self.history.push(Turn::user(utterance));
        self.pending_reply = true;
        Ok(slot)
    }

    /// Issue the workshop turn for the captured utterance.
    ///
    /// On a backend failure the captured item and the pending flag are left
    /// untouched, so calling again retries the same turn without asking the
    /// user to resubmit.
    pub async fn exchange(&mut self, backend: &dyn Dialogue) -> Result<String, TurnError> {
        if self.phase != Phase::Workshop {
            return Err(TurnError::WrongPhase(self.phase));
        }
        if !self.pending_reply {
            return Err(TurnError::NoPendingTurn);
        }

        let request = DialogueRequest {
            mode: Mode::Workshop,
            card: self.card,
            user_label: &self.user_label,
            lang: self.lang,
            target: self.target,
            collected: &self.collected,
            history: &self.history,
        };
        let raw = backend.converse(&request).await?;

        let (reply, advisory) = advisory::extract(&raw);
        self.reconcile(advisory.as_ref());

        self.history.push(Turn::system(reply.clone()));
        self.pending_reply = false;
        if self.collected.meets(&self.target) {
            self.phase = Phase::Complete;
        }
        Ok(reply)
    }

    /// Capture an utterance and issue its workshop turn in one step.
    pub async fn turn(
        &mut self,
        backend: &dyn Dialogue,
        utterance: &str,
    ) -> Result<TurnReport, TurnError> {
        let slot = self.capture(utterance)?;
        let reply = self.exchange(backend).await?;
        Ok(TurnReport {
            reply,
            slot,
            phase: self.phase,
        })
    }

    /// The advisory block is display-side courtesy only. Drift is logged
    /// and discarded; the controller's own tally is always authoritative.
    fn reconcile(&self, advisory: Option<&Advisory>) {
        let Some(advisory) = advisory else {
            return;
        };
        let drifted = advisory.current_objects.len() != self.collected.objects.len()
            || advisory.current_colors.len() != self.collected.colors.len()
            || advisory.is_complete != self.collected.meets(&self.target);
        if drifted {
            warn!(
                advisory_objects = advisory.current_objects.len(),
                advisory_colors = advisory.current_colors.len(),
                tally_objects = self.collected.objects.len(),
                tally_colors = self.collected.colors.len(),
                "backend advisory disagrees with the controller tally"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcana;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend double that replays a script of canned outcomes.
    struct ScriptedBackend {
        script: Mutex<Vec<Result<String, u16>>>,
        modes: Mutex<Vec<Mode>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<String, u16>>) -> Self {
            Self {
                script: Mutex::new(script),
                modes: Mutex::new(Vec::new()),
            }
        }

        fn replying(reply: &str, times: usize) -> Self {
            Self::new(vec![Ok(reply.to_string()); times])
        }

        fn modes(&self) -> Vec<Mode> {
            self.modes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Dialogue for ScriptedBackend {
        async fn converse(&self, request: &DialogueRequest<'_>) -> Result<String, BackendError> {
            self.modes.lock().unwrap().push(request.mode);
            let next = self.script.lock().unwrap().remove(0);
            next.map_err(|status| BackendError::Status {
                status,
                message: "scripted failure".into(),
            })
        }
    }

    fn world_card() -> &'static crate::arcana::ArcanaCard {
        arcana::card_by_id(21).unwrap()
    }

    fn elicitor(target: ElicitationTarget) -> Elicitor {
        Elicitor::new(world_card(), target, "로터스".into(), Lang::Ko)
    }

    #[tokio::test]
    async fn reveal_is_issued_exactly_once() {
        let backend = ScriptedBackend::replying("당신의 생애 위로 그림자가 드리웁니다.", 1);
        let mut session = elicitor(ElicitationTarget::default());

        let narrative = session.reveal(&backend).await.unwrap();
        assert!(narrative.contains("그림자"));
        assert_eq!(session.phase(), Phase::Reveal);
        assert!(session.history().is_empty());

        assert!(matches!(
            session.reveal(&backend).await,
            Err(TurnError::RevealAlreadyIssued)
        ));
        assert_eq!(backend.modes(), vec![Mode::Reveal]);
    }

    #[tokio::test]
    async fn reveal_failure_can_be_reissued() {
        let backend = ScriptedBackend::new(vec![Err(503), Ok("narrative".into())]);
        let mut session = elicitor(ElicitationTarget::default());

        assert!(session.reveal(&backend).await.is_err());
        assert!(session.acknowledge().is_err());

        session.reveal(&backend).await.unwrap();
        session.acknowledge().unwrap();
        assert_eq!(session.phase(), Phase::Workshop);
    }

    #[tokio::test]
    async fn workshop_requires_acknowledgement() {
        let backend = ScriptedBackend::replying("reply", 1);
        let mut session = elicitor(ElicitationTarget::default());
        session.reveal(&backend).await.unwrap();

        assert!(matches!(
            session.capture("고양이"),
            Err(TurnError::WrongPhase(Phase::Reveal))
        ));
    }

    #[tokio::test]
    async fn utterances_fill_objects_before_colors() {
        let backend = ScriptedBackend::replying("조각이 놓였습니다.", 5);
        let mut session = elicitor(ElicitationTarget::default());
        session.reveal(&ScriptedBackend::replying("n", 1)).await.unwrap();
        session.acknowledge().unwrap();

        let mut slots = Vec::new();
        for item in ["cat", "key", "rose", "violet", "gold"] {
            let report = session.turn(&backend, item).await.unwrap();
            slots.push(report.slot);
        }

        assert_eq!(
            slots,
            vec![
                Slot::Object,
                Slot::Object,
                Slot::Object,
                Slot::Color,
                Slot::Color
            ]
        );
        assert_eq!(session.collected().objects, vec!["cat", "key", "rose"]);
        assert_eq!(session.collected().colors, vec!["violet", "gold"]);
    }

    #[tokio::test]
    async fn completion_lands_exactly_on_the_final_utterance() {
        let backend = ScriptedBackend::replying("reply", 5);
        let mut session = elicitor(ElicitationTarget::default());
        session.reveal(&ScriptedBackend::replying("n", 1)).await.unwrap();
        session.acknowledge().unwrap();

        for item in ["cat", "key", "rose", "violet"] {
            let report = session.turn(&backend, item).await.unwrap();
            assert_eq!(report.phase, Phase::Workshop);
        }
        let last = session.turn(&backend, "gold").await.unwrap();
        assert_eq!(last.phase, Phase::Complete);
    }

    #[tokio::test]
    async fn complete_sessions_accept_no_further_items() {
        let backend = ScriptedBackend::replying("reply", 3);
        let mut session = elicitor(ElicitationTarget::new(1, 1));
        session.reveal(&ScriptedBackend::replying("n", 1)).await.unwrap();
        session.acknowledge().unwrap();

        session.turn(&backend, "moth").await.unwrap();
        session.turn(&backend, "indigo").await.unwrap();
        assert_eq!(session.phase(), Phase::Complete);

        let frozen = session.collected().clone();
        assert!(matches!(
            session.turn(&backend, "extra").await,
            Err(TurnError::SessionComplete)
        ));
        assert_eq!(session.collected(), &frozen);
    }

    #[tokio::test]
    async fn advisory_content_never_mutates_the_tally() {
        let bogus = "마지막 답변.\n{\"current_objects\": [\"a\", \"b\", \"c\", \"d\", \"e\"], \"current_colors\": [\"x\", \"y\", \"z\"], \"is_complete\": false}";
        let backend = ScriptedBackend::replying(bogus, 2);
        let mut session = elicitor(ElicitationTarget::new(1, 1));
        session.reveal(&ScriptedBackend::replying("n", 1)).await.unwrap();
        session.acknowledge().unwrap();

        session.turn(&backend, "moth").await.unwrap();
        let report = session.turn(&backend, "indigo").await.unwrap();

        assert_eq!(report.phase, Phase::Complete);
        assert_eq!(session.collected().objects, vec!["moth"]);
        assert_eq!(session.collected().colors, vec!["indigo"]);
        assert_eq!(report.reply, "마지막 답변.");
    }

    #[tokio::test]
    async fn backend_failure_keeps_the_captured_item() {
        let backend = ScriptedBackend::new(vec![Err(503), Ok("다시 잇습니다.".into())]);
        let mut session = elicitor(ElicitationTarget::default());
        session.reveal(&ScriptedBackend::replying("n", 1)).await.unwrap();
        session.acknowledge().unwrap();

        let err = session.turn(&backend, "cat").await.unwrap_err();
        assert!(matches!(err, TurnError::Backend(_)));
        assert_eq!(session.collected().objects, vec!["cat"]);
        assert_eq!(session.phase(), Phase::Workshop);

        // A new utterance is refused until the pending reply is delivered.
        assert!(matches!(
            session.capture("key"),
            Err(TurnError::TurnInFlight)
        ));

        // Retrying the exchange does not recapture the utterance.
        let reply = session.exchange(&backend).await.unwrap();
        assert_eq!(reply, "다시 잇습니다.");
        assert_eq!(session.collected().objects, vec!["cat"]);
        assert!(!session.reply_pending());
    }

    #[tokio::test]
    async fn resume_derives_the_phase_from_the_tally() {
        let complete = Collected {
            objects: vec!["a".into(), "b".into(), "c".into()],
            colors: vec!["d".into(), "e".into()],
        };
        let session = Elicitor::resume(
            world_card(),
            ElicitationTarget::default(),
            "로터스".into(),
            Lang::Ko,
            complete,
            Vec::new(),
            false,
        );
        assert_eq!(session.phase(), Phase::Complete);

        let partial = Collected {
            objects: vec!["a".into()],
            colors: Vec::new(),
        };
        let session = Elicitor::resume(
            world_card(),
            ElicitationTarget::default(),
            "로터스".into(),
            Lang::Ko,
            partial,
            Vec::new(),
            false,
        );
        assert_eq!(session.phase(), Phase::Workshop);
    }

    #[tokio::test]
    async fn resumed_pending_turn_is_exchanged_without_recapture() {
        let collected = Collected {
            objects: vec!["cat".into()],
            colors: Vec::new(),
        };
        let history = vec![Turn::user("cat")];
        let mut session = Elicitor::resume(
            world_card(),
            ElicitationTarget::default(),
            "로터스".into(),
            Lang::Ko,
            collected,
            history,
            true,
        );

        let backend = ScriptedBackend::replying("조각이 놓였습니다.", 1);
        session.exchange(&backend).await.unwrap();
        assert_eq!(session.collected().objects, vec!["cat"]);
    }

    #[tokio::test]
    async fn full_ritual_for_a_known_birthdate() {
        let card = arcana::life_path("19900101").unwrap();
        assert_eq!(card.id, 21);

        let backend = ScriptedBackend::new(vec![
            Ok("당신의 생애 위로 '세계'의 그림자가 드리웁니다.".into()),
            Ok("첫 조각입니다.".into()),
            Ok("둘째 조각입니다.".into()),
            Ok("셋째 조각입니다.".into()),
            Ok("첫 색입니다.".into()),
            Ok("모든 조각과 색이 채워졌습니다.".into()),
        ]);

        let mut session = Elicitor::new(
            card,
            ElicitationTarget::default(),
            "로터스".into(),
            Lang::Ko,
        );
        session.reveal(&backend).await.unwrap();
        session.acknowledge().unwrap();

        for item in ["cat", "key", "rose", "violet"] {
            assert_eq!(session.turn(&backend, item).await.unwrap().phase, Phase::Workshop);
        }
        let last = session.turn(&backend, "gold").await.unwrap();
        assert_eq!(last.phase, Phase::Complete);
        assert_eq!(
            backend.modes(),
            vec![
                Mode::Reveal,
                Mode::Workshop,
                Mode::Workshop,
                Mode::Workshop,
                Mode::Workshop,
                Mode::Workshop
            ]
        );
    }
}
