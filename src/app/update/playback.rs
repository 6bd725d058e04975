use super::super::state::Reader;
use super::Effect;
use super::core::push_once;
use crate::geometry::hit_test::DistanceMetric;
use crate::geometry::{Point, nearest_unit};
use std::time::Instant;
use tracing::{debug, info};

impl Reader {
    pub(super) fn handle_play(&mut self, now: Instant) {
        if !self.is_ready() {
            debug!(
                extraction = ?self.document.extraction,
                "Nothing to play yet"
            );
            return;
        }
        self.pacer.play(now);
    }

    pub(super) fn handle_pause(&mut self) {
        self.pacer.pause();
    }

    pub(super) fn handle_toggle_play_pause(&mut self, now: Instant) {
        if self.pacer.is_playing() {
            self.handle_pause();
        } else {
            self.handle_play(now);
        }
    }

    /// Stop rewinds to the first unit and forgets the saved session.
    pub(super) fn handle_stop(&mut self, effects: &mut Vec<Effect>) {
        let events = self.pacer.stop();
        self.apply_pacer_events(events, effects);
        effects.retain(|effect| *effect != Effect::SaveSession);
        effects.push(Effect::ClearSession);
    }

    pub(super) fn handle_set_wpm(&mut self, wpm: u32, now: Instant, effects: &mut Vec<Effect>) {
        let snapped = self.config.wpm_range().snap(wpm);
        let before = self.pacer.wpm();
        let applied = self.pacer.set_wpm(snapped, now);
        if applied != before {
            push_once(effects, Effect::SaveSession);
        }
    }

    pub(super) fn handle_jump_to(&mut self, index: usize, now: Instant, effects: &mut Vec<Effect>) {
        let events = self.pacer.jump_to(index, now);
        self.apply_pacer_events(events, effects);
    }

    pub(super) fn handle_clicked(&mut self, point: Point, now: Instant, effects: &mut Vec<Effect>) {
        let metric = DistanceMetric::from(self.config.granularity);
        let Some(index) = nearest_unit(&self.document.units, point, metric) else {
            return;
        };
        debug!(x = point.x, y = point.y, index, "Click resolved to unit");
        self.handle_jump_to(index, now, effects);
    }

    /// Settle a pending scroll first: a manual scroll that came to rest
    /// pauses playback before any due advance runs.
    pub(super) fn handle_tick(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        if let Some(caused) = self.scroll.take_settled(now) {
            if !caused && self.pacer.is_playing() {
                info!(
                    index = self.pacer.current_index(),
                    "Manual scroll detected; pausing"
                );
                self.pacer.pause();
            }
        }
        let events = self.pacer.tick(now);
        self.apply_pacer_events(events, effects);
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::fixtures::{
        VIEWPORT_HEIGHT, line_layout, open_and_extract, ready_reader, reopen, shared_store,
    };
    use super::super::super::{Command, Message, Reader};
    use crate::config::AppConfig;
    use crate::geometry::Point;
    use crate::source::DocumentSource;
    use crate::timing::Granularity;
    use std::time::{Duration, Instant};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn scroll_targets(commands: &[Command]) -> Vec<f64> {
        commands
            .iter()
            .filter_map(|c| match c {
                Command::ScrollTo { top, .. } => Some(*top),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn play_before_extraction_is_a_no_op() {
        let t0 = Instant::now();
        let mut reader = Reader::new(
            AppConfig::default(),
            crate::persistence::SessionStore::in_memory(),
        );
        reader.update(Message::Play, t0);
        assert!(!reader.is_playing());
        assert_eq!(reader.next_deadline(), None);
    }

    #[test]
    fn ticks_advance_and_follow_the_active_line() {
        let t0 = Instant::now();
        let mut reader = ready_reader(&[0.0, 400.0, 800.0, 1200.0], AppConfig::default(), t0);
        reader.update(Message::Play, t0);
        assert_eq!(reader.next_deadline(), Some(t0 + ms(200)));

        assert!(reader.update(Message::Tick, t0 + ms(150)).is_empty());
        let commands = reader.update(Message::Tick, t0 + ms(200));
        assert_eq!(reader.current_index(), 1);
        let targets = scroll_targets(&commands);
        assert_eq!(targets.len(), 1);
        let expected = 400.0 - VIEWPORT_HEIGHT / 3.0;
        assert!(
            (targets[0] - expected).abs() < 1e-6,
            "follow scroll should place the line a third down the viewport"
        );
    }

    #[test]
    fn follow_scroll_is_clamped_at_the_top() {
        let t0 = Instant::now();
        let mut reader = ready_reader(&[0.0, 40.0, 80.0], AppConfig::default(), t0);
        reader.update(
            Message::Scrolled {
                scroll_top: 120.0,
                viewport_height: VIEWPORT_HEIGHT,
            },
            t0,
        );
        reader.update(Message::Tick, t0 + ms(100));
        reader.update(Message::Play, t0 + ms(100));
        let commands = reader.update(Message::Tick, t0 + ms(300));
        assert_eq!(reader.current_index(), 1);
        assert_eq!(scroll_targets(&commands), vec![0.0]);
    }

    #[test]
    fn no_follow_scroll_when_already_in_place() {
        let t0 = Instant::now();
        let mut reader = ready_reader(&[0.0, 40.0, 80.0], AppConfig::default(), t0);
        reader.update(Message::Play, t0);
        let commands = reader.update(Message::Tick, t0 + ms(200));
        assert_eq!(reader.current_index(), 1);
        assert!(scroll_targets(&commands).is_empty());
        assert_eq!(reader.next_deadline(), Some(t0 + ms(400)));
    }

    #[test]
    fn follow_scroll_can_be_disabled() {
        let t0 = Instant::now();
        let mut config = AppConfig::default();
        config.auto_scroll = false;
        let mut reader = ready_reader(&[0.0, 400.0, 800.0], config, t0);
        reader.update(Message::Play, t0);
        let commands = reader.update(Message::Tick, t0 + ms(200));
        assert_eq!(reader.current_index(), 1);
        assert!(scroll_targets(&commands).is_empty());
    }

    #[test]
    fn manual_scroll_pauses_once_settled() {
        let t0 = Instant::now();
        let mut reader = ready_reader(&[0.0, 400.0, 800.0], AppConfig::default(), t0);
        reader.update(Message::Play, t0);
        reader.update(
            Message::Scrolled {
                scroll_top: 250.0,
                viewport_height: VIEWPORT_HEIGHT,
            },
            t0 + ms(50),
        );
        assert!(reader.is_playing(), "pausing waits for the scroll to settle");
        assert_eq!(reader.next_deadline(), Some(t0 + ms(150)));

        reader.update(Message::Tick, t0 + ms(150));
        assert!(!reader.is_playing());
        assert_eq!(reader.current_index(), 0);
        reader.update(Message::Tick, t0 + ms(1000));
        assert_eq!(reader.current_index(), 0, "no advance after the pause");
    }

    #[test]
    fn follow_scroll_reports_do_not_pause() {
        let t0 = Instant::now();
        let mut reader = ready_reader(&[0.0, 400.0, 800.0], AppConfig::default(), t0);
        reader.update(Message::Play, t0);
        reader.update(Message::Tick, t0 + ms(200));
        reader.update(
            Message::Scrolled {
                scroll_top: 150.0,
                viewport_height: VIEWPORT_HEIGHT,
            },
            t0 + ms(250),
        );
        reader.update(
            Message::Scrolled {
                scroll_top: 300.0,
                viewport_height: VIEWPORT_HEIGHT,
            },
            t0 + ms(320),
        );
        reader.update(Message::Tick, t0 + ms(420));
        assert!(reader.is_playing());
        assert_eq!(reader.scroll_top(), 300.0);
    }

    #[test]
    fn manual_scroll_between_fast_advances_pauses() {
        let t0 = Instant::now();
        let ys: Vec<f64> = (0..30).map(|i| i as f64 * 400.0).collect();
        let mut reader = ready_reader(&ys, AppConfig::default(), t0);
        reader.update(Message::Play, t0);

        let commands = reader.update(Message::Tick, t0 + ms(200));
        assert_eq!(scroll_targets(&commands).len(), 1, "first advance follows");
        reader.update(
            Message::Scrolled {
                scroll_top: 9000.0,
                viewport_height: VIEWPORT_HEIGHT,
            },
            t0 + ms(300),
        );
        for step in 2..=19 {
            reader.update(Message::Tick, t0 + ms(100 * step));
        }
        assert!(
            !reader.is_playing(),
            "a manual scroll should pause even when units are short"
        );
        assert_eq!(reader.current_index(), 1);
    }

    #[test]
    fn click_jumps_to_the_nearest_line() {
        let t0 = Instant::now();
        let mut reader = ready_reader(&[0.0, 100.0, 200.0], AppConfig::default(), t0);
        reader.update(Message::Clicked(Point::new(700.0, 105.0)), t0);
        assert_eq!(reader.current_index(), 1);
    }

    #[test]
    fn click_in_word_mode_uses_both_axes() {
        let t0 = Instant::now();
        let mut config = AppConfig::default();
        config.granularity = Granularity::WordChunks;
        config.words_per_chunk = 1;
        let mut reader = Reader::new(config, crate::persistence::SessionStore::in_memory());
        let mut layout = line_layout(&[0.0]);
        layout.pages[0].spans = vec![
            crate::geometry::SpanBox::new(
                "aa bb",
                crate::geometry::Rect::new(0.0, 0.0, 50.0, 20.0),
            )
            .with_uniform_glyphs(),
        ];
        open_and_extract(
            &mut reader,
            DocumentSource::remote("https://example.com/a.pdf"),
            &layout,
            t0,
        );
        assert_eq!(reader.units().len(), 2);
        reader.update(Message::Clicked(Point::new(45.0, 10.0)), t0);
        assert_eq!(reader.current_index(), 1);
    }

    #[test]
    fn jump_while_playing_continues_from_the_target() {
        let t0 = Instant::now();
        let ys = [0.0, 100.0, 200.0, 300.0, 400.0];
        let mut reader = ready_reader(&ys, AppConfig::default(), t0);
        reader.update(Message::Play, t0);
        reader.update(Message::JumpTo(2), t0 + ms(50));
        reader.update(Message::Tick, t0 + ms(200));
        assert_eq!(reader.current_index(), 2);
        reader.update(Message::Tick, t0 + ms(250));
        assert_eq!(reader.current_index(), 3);
    }

    #[test]
    fn completion_is_reported_once() {
        let t0 = Instant::now();
        let mut reader = ready_reader(&[0.0, 100.0], AppConfig::default(), t0);
        reader.update(Message::Play, t0);
        let mut finished = 0;
        for step in 1..=10 {
            let commands = reader.update(Message::Tick, t0 + ms(100 * step));
            finished += commands
                .iter()
                .filter(|c| **c == Command::PlaybackFinished)
                .count();
        }
        assert_eq!(finished, 1);
        assert!(!reader.is_playing());
        assert_eq!(reader.current_index(), 1);
    }

    #[test]
    fn progress_is_saved_past_the_first_unit() {
        let t0 = Instant::now();
        let (store, metadata, blobs) = shared_store();
        let mut reader = Reader::new(AppConfig::default(), store);
        open_and_extract(
            &mut reader,
            DocumentSource::remote("https://x/y.pdf"),
            &line_layout(&[0.0, 100.0, 200.0]),
            t0,
        );
        reader.update(Message::Play, t0);
        assert!(reopen(&metadata, &blobs).load().is_none());

        reader.update(Message::Tick, t0 + ms(400));
        let saved = reopen(&metadata, &blobs).load().expect("saved after advancing");
        assert_eq!(saved.session.position, 2);
        assert_eq!(saved.session.wpm, 300);
    }

    #[test]
    fn stop_rewinds_and_clears_the_saved_session() {
        let t0 = Instant::now();
        let (store, metadata, blobs) = shared_store();
        let mut reader = Reader::new(AppConfig::default(), store);
        open_and_extract(
            &mut reader,
            DocumentSource::remote("https://x/y.pdf"),
            &line_layout(&[0.0, 100.0, 200.0]),
            t0,
        );
        reader.update(Message::JumpTo(2), t0);
        assert!(reopen(&metadata, &blobs).load().is_some());

        reader.update(Message::Stop, t0);
        assert_eq!(reader.current_index(), 0);
        assert!(!reader.is_playing());
        assert!(reopen(&metadata, &blobs).load().is_none());
    }

    #[test]
    fn speed_changes_snap_to_the_slider_and_save() {
        let t0 = Instant::now();
        let (store, metadata, blobs) = shared_store();
        let mut reader = Reader::new(AppConfig::default(), store);
        open_and_extract(
            &mut reader,
            DocumentSource::remote("https://x/y.pdf"),
            &line_layout(&[0.0, 100.0, 200.0]),
            t0,
        );
        reader.update(Message::JumpTo(1), t0);
        reader.update(Message::SetWpm(437), t0);
        assert_eq!(reader.wpm(), 425);
        reader.update(Message::SetWpm(5000), t0);
        assert_eq!(reader.wpm(), 600);

        let saved = reopen(&metadata, &blobs).load().expect("saved session");
        assert_eq!(saved.session.wpm, 600);
        assert_eq!(saved.session.position, 1);
    }

    #[test]
    fn toggle_flips_between_play_and_pause() {
        let t0 = Instant::now();
        let mut reader = ready_reader(&[0.0, 100.0], AppConfig::default(), t0);
        reader.update(Message::TogglePlayPause, t0);
        assert!(reader.is_playing());
        reader.update(Message::TogglePlayPause, t0 + ms(10));
        assert!(!reader.is_playing());
        assert_eq!(reader.next_deadline(), None);
    }
}
