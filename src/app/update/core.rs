use super::super::messages::{Command, Message};
use super::super::state::Reader;
use super::Effect;
use crate::pacer::PacerEvent;
use std::time::Instant;
use tracing::debug;

impl Reader {
    /// Apply one message at time `now` and return what the host must do.
    pub fn update(&mut self, message: Message, now: Instant) -> Vec<Command> {
        let effects = self.reduce(message, now);
        self.run_effects(effects, now)
    }

    pub(super) fn run_effects(&mut self, effects: Vec<Effect>, now: Instant) -> Vec<Command> {
        effects
            .into_iter()
            .filter_map(|effect| self.run_effect(effect, now))
            .collect()
    }

    fn reduce(&mut self, message: Message, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::OpenSource(source) => self.handle_open_source(source),
            Message::PagesRendered => self.handle_pages_rendered(&mut effects),
            Message::Clicked(point) => self.handle_clicked(point, now, &mut effects),
            Message::Scrolled {
                scroll_top,
                viewport_height,
            } => self.handle_scrolled(scroll_top, viewport_height, now),
            Message::Resized {
                viewport_width,
                viewport_height,
            } => self.handle_resized(viewport_width, viewport_height),
            Message::Tick => self.handle_tick(now, &mut effects),
            Message::Play => self.handle_play(now),
            Message::Pause => self.handle_pause(),
            Message::TogglePlayPause => self.handle_toggle_play_pause(now),
            Message::Stop => self.handle_stop(&mut effects),
            Message::SetWpm(wpm) => self.handle_set_wpm(wpm, now, &mut effects),
            Message::JumpTo(index) => self.handle_jump_to(index, now, &mut effects),
            Message::Resume => self.handle_resume(now, &mut effects),
            Message::StartFresh => self.handle_start_fresh(&mut effects),
        }

        effects
    }

    fn run_effect(&mut self, effect: Effect, now: Instant) -> Option<Command> {
        match effect {
            Effect::FollowCurrent => self.follow_current(now),
            Effect::SaveSession => {
                self.persist_session();
                None
            }
            Effect::ClearSession => {
                self.store.clear();
                None
            }
            Effect::RequestFrame => Some(Command::RequestFrame),
            Effect::LoadSource(source) => Some(Command::LoadSource(source)),
            Effect::NotifyFinished => Some(Command::PlaybackFinished),
        }
    }

    pub(super) fn apply_pacer_events(
        &mut self,
        events: Vec<PacerEvent>,
        effects: &mut Vec<Effect>,
    ) {
        for event in events {
            match event {
                PacerEvent::IndexChanged(index) => {
                    debug!(index, "Active unit changed");
                    push_once(effects, Effect::FollowCurrent);
                    push_once(effects, Effect::SaveSession);
                }
                PacerEvent::Completed => effects.push(Effect::NotifyFinished),
            }
        }
    }
}

/// Follow and save both read live state when they run, so one of each per
/// batch is enough even when a late tick advanced several units.
pub(super) fn push_once(effects: &mut Vec<Effect>, effect: Effect) {
    if !effects.contains(&effect) {
        effects.push(effect);
    }
}
