use iso_engine::{Canvas, InputSnapshot, Scene, SceneCommand};
use tracing::{error, info};

use super::audio::{AudioCue, AudioSink};
use super::gameplay::art::LevelArt;
use super::gameplay::catalog::LevelCatalog;
use super::gameplay::level::{Level, LevelError, LevelOutcome, LevelSetup};
use super::gameplay::player::PlayerInput;
use super::scores::ScoreBoard;
use super::view;

const GAME_NAME: &str = "Iso Prince";
/// Number of entries per level logged when a run ends.
const SUMMARY_TOP_SCORES: usize = 5;
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Per-run choices that do not change while the game is open.
#[derive(Debug, Clone)]
pub(crate) struct SessionOptions {
    pub(crate) nick: String,
    pub(crate) seed: u64,
    pub(crate) chase_dead_zone: f32,
    pub(crate) volume: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GameOverSummary {
    pub(crate) won: bool,
    pub(crate) levels_cleared: usize,
    pub(crate) elapsed_seconds: f32,
}

#[derive(Debug)]
enum Phase {
    Title,
    Playing(Box<Level>),
    GameOver(GameOverSummary),
}

/// Title screen, level sequence and game-over screen. Levels are rebuilt from the catalog
/// on every start; the session owns nothing that survives a return to the title except
/// the catalog, the art and the score board.
#[derive(Debug)]
pub(crate) struct GameSession<A: AudioSink> {
    catalog: LevelCatalog,
    art: LevelArt,
    scores: ScoreBoard,
    audio: A,
    options: SessionOptions,
    level_index: usize,
    elapsed: f32,
    phase: Phase,
}

impl<A: AudioSink> GameSession<A> {
    pub(crate) fn new(
        catalog: LevelCatalog,
        art: LevelArt,
        scores: ScoreBoard,
        audio: A,
        options: SessionOptions,
    ) -> Self {
        Self {
            catalog,
            art,
            scores,
            audio,
            options,
            level_index: 0,
            elapsed: 0.0,
            phase: Phase::Title,
        }
    }

    /// Builds every catalog level once so broken art or oversized maps fail at startup.
    pub(crate) fn validate_levels(&self) -> Result<(), LevelError> {
        for entry in self.catalog.iter() {
            Level::build(&entry.map, &self.art, LevelSetup::new(entry.id.clone()))?;
        }
        Ok(())
    }

    pub(crate) fn start_new_game(&mut self) {
        self.level_index = 0;
        info!(nick = %self.options.nick, levels = self.catalog.len(), "game_started");
        self.start_level(None);
    }

    fn start_level(&mut self, carried_hp: Option<i32>) {
        let index = self.level_index;
        let Some(entry) = self.catalog.get(index) else {
            error!(index, "level_index_out_of_range");
            self.game_over(false);
            return;
        };
        let setup = LevelSetup {
            id: entry.id.clone(),
            has_next: index + 1 < self.catalog.len(),
            carried_hp,
            seed: level_seed(self.options.seed, index),
            chase_dead_zone: self.options.chase_dead_zone,
        };
        match Level::build(&entry.map, &self.art, setup) {
            Ok(level) => {
                info!(level = %entry.id, index, "level_started");
                self.elapsed = 0.0;
                self.phase = Phase::Playing(Box::new(level));
            }
            Err(error) => {
                error!(error = %error, "level_build_failed");
                self.game_over(false);
            }
        }
    }

    fn finish_level(&mut self, outcome: LevelOutcome, level_id: &str, score: u32, hp: i32) {
        match outcome {
            LevelOutcome::Cleared { has_next } => {
                self.audio.play(AudioCue::LevelCleared);
                self.scores.add_score(level_id, &self.options.nick, score);
                if has_next {
                    self.level_index += 1;
                    self.start_level(Some(hp));
                } else {
                    self.game_over(true);
                }
            }
            LevelOutcome::Lost => self.game_over(false),
        }
    }

    fn game_over(&mut self, won: bool) {
        let summary = GameOverSummary {
            won,
            levels_cleared: self.level_index + usize::from(won),
            elapsed_seconds: self.elapsed,
        };
        if !won {
            self.audio.play(AudioCue::GameOver);
        }
        info!(
            won,
            levels_cleared = summary.levels_cleared,
            elapsed_seconds = summary.elapsed_seconds,
            "game_over"
        );
        for level in self.catalog.ids() {
            let top = self.scores.top(level, SUMMARY_TOP_SCORES);
            if top.is_empty() {
                continue;
            }
            let listing = top
                .iter()
                .map(|entry| format!("{}:{}", entry.name, entry.score))
                .collect::<Vec<_>>()
                .join(", ");
            info!(level, top = %listing, "high_scores");
        }
        self.phase = Phase::GameOver(summary);
    }

    fn return_to_title(&mut self) {
        self.level_index = 0;
        self.elapsed = 0.0;
        self.phase = Phase::Title;
        info!("returned_to_title");
    }

    #[cfg(test)]
    pub(crate) fn level_index(&self) -> usize {
        self.level_index
    }

    #[cfg(test)]
    pub(crate) fn level(&self) -> Option<&Level> {
        match &self.phase {
            Phase::Playing(level) => Some(level),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn summary(&self) -> Option<GameOverSummary> {
        match self.phase {
            Phase::GameOver(summary) => Some(summary),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_on_title(&self) -> bool {
        matches!(self.phase, Phase::Title)
    }
}

impl<A: AudioSink> Scene for GameSession<A> {
    fn load(&mut self) {
        self.audio.set_master_volume(self.options.volume);
        info!(levels = self.catalog.len(), "session_loaded");
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        match &mut self.phase {
            Phase::Title => {
                if input.confirm_pressed() {
                    self.start_new_game();
                }
            }
            Phase::Playing(level) => {
                self.elapsed += fixed_dt_seconds;
                let controls = PlayerInput::from_snapshot(input);
                if let Some(outcome) = level.step(fixed_dt_seconds, &controls, &mut self.audio) {
                    let level_id = level.id().to_string();
                    let (score, hp) = (level.score(), level.player().hp());
                    self.finish_level(outcome, &level_id, score, hp);
                }
            }
            Phase::GameOver(_) => {
                if input.confirm_pressed() {
                    self.return_to_title();
                }
            }
        }
        SceneCommand::None
    }

    fn render(&self, canvas: &mut Canvas<'_>) {
        match &self.phase {
            Phase::Title => view::draw_title(canvas),
            Phase::Playing(level) => view::draw_level(level, canvas),
            Phase::GameOver(summary) => view::draw_game_over(canvas, summary.won),
        }
    }

    fn unload(&mut self) {
        info!(level_index = self.level_index, "session_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        let title = match &self.phase {
            Phase::Title => format!("{GAME_NAME} | Enter to start, Esc to quit"),
            Phase::Playing(level) => format!(
                "{GAME_NAME} | Level {} | HP {} | Score {} | {}s",
                self.level_index + 1,
                level.player().hp().max(0),
                level.score(),
                self.elapsed as u32
            ),
            Phase::GameOver(summary) if summary.won => format!(
                "Congratulations! You finished {} level(s) in {}s | Enter for menu",
                summary.levels_cleared, summary.elapsed_seconds as u32
            ),
            Phase::GameOver(summary) => format!(
                "Game Over! Levels cleared: {}  Time: {}s | Enter for menu",
                summary.levels_cleared, summary.elapsed_seconds as u32
            ),
        };
        Some(title)
    }
}

/// Distinct but reproducible stream per level.
fn level_seed(base: u64, index: usize) -> u64 {
    base ^ (index as u64 + 1).wrapping_mul(SEED_MIX)
}

#[cfg(test)]
mod tests {
    use iso_engine::InputAction;

    use super::*;
    use crate::app::audio::RecordingAudio;

    const DT: f32 = 1.0 / 60.0;

    fn session(levels: &[(&str, &str)]) -> (tempfile::TempDir, GameSession<RecordingAudio>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = LevelCatalog::from_sources(
            levels
                .iter()
                .map(|(id, text)| (id.to_string(), text.to_string())),
        )
        .expect("catalog");
        let session = GameSession::new(
            catalog,
            LevelArt::solid(),
            ScoreBoard::in_dir(dir.path()),
            RecordingAudio::default(),
            SessionOptions {
                nick: "Ada".to_string(),
                seed: 7,
                chase_dead_zone: 0.0,
                volume: 0.6,
            },
        );
        (dir, session)
    }

    fn confirm() -> InputSnapshot {
        InputSnapshot::empty().with_confirm_pressed(true)
    }

    #[test]
    fn confirm_on_title_starts_first_level() {
        let (_dir, mut session) = session(&[("level1", "P..")]);
        assert!(session.is_on_title());
        session.update(DT, &InputSnapshot::empty());
        assert!(session.is_on_title());

        session.update(DT, &confirm());
        assert_eq!(session.level().map(Level::id), Some("level1"));
        assert_eq!(session.level_index(), 0);
    }

    #[test]
    fn ladder_advances_then_wins_on_last_level() {
        let (_dir, mut session) = session(&[("level1", "PL"), ("level2", "PL")]);
        session.start_new_game();

        session.update(DT, &InputSnapshot::empty());
        assert_eq!(session.level_index(), 1);
        assert_eq!(session.level().map(Level::id), Some("level2"));

        session.update(DT, &InputSnapshot::empty());
        let summary = session.summary().expect("game over");
        assert!(summary.won);
        assert_eq!(summary.levels_cleared, 2);
        assert_eq!(session.audio.count(AudioCue::LevelCleared), 2);
        assert_eq!(session.audio.count(AudioCue::GameOver), 0);
        assert_eq!(session.scores.top("level1", 5).len(), 1);
        assert_eq!(session.scores.top("level2", 5)[0].name, "Ada");
    }

    #[test]
    fn health_carries_into_next_level() {
        let (_dir, mut session) = session(&[("level1", "P.\n.L"), ("level2", "P")]);
        session.start_new_game();
        if let Phase::Playing(level) = &mut session.phase {
            level.player_mut().set_hp(45);
            let ladder = level.ladders()[0].rect();
            level.player_mut().body.pos = iso_engine::Vec2::new(ladder.x as f32, ladder.y as f32);
        }
        session.update(DT, &InputSnapshot::empty());
        assert_eq!(session.level().map(|level| level.player().hp()), Some(45));
    }

    #[test]
    fn falling_out_ends_the_run_as_a_loss() {
        let (_dir, mut session) = session(&[("level1", "P..."), ("level2", "P")]);
        session.start_new_game();
        if let Phase::Playing(level) = &mut session.phase {
            level.player_mut().body.pos = iso_engine::Vec2::new(5000.0, 5000.0);
        }
        for _ in 0..30 {
            session.update(DT, &InputSnapshot::empty());
        }

        let summary = session.summary().expect("game over");
        assert!(!summary.won);
        assert_eq!(summary.levels_cleared, 0);
        assert_eq!(session.audio.count(AudioCue::GameOver), 1);
        assert!(session.scores.top("level1", 5).is_empty());
        let title = session.debug_title().expect("title");
        assert!(title.starts_with("Game Over! Levels cleared: 0"), "{title}");
    }

    #[test]
    fn confirm_after_game_over_returns_to_title() {
        let (_dir, mut session) = session(&[("level1", "PL")]);
        session.start_new_game();
        session.update(DT, &InputSnapshot::empty());
        assert!(session.summary().is_some());

        session.update(DT, &confirm());
        assert!(session.is_on_title());
        assert_eq!(session.level_index(), 0);
    }

    #[test]
    fn quit_is_honoured_in_every_phase() {
        let (_dir, mut session) = session(&[("level1", "P..")]);
        let quit = InputSnapshot::empty().with_quit_requested(true);
        assert_eq!(session.update(DT, &quit), SceneCommand::Quit);
        session.start_new_game();
        assert_eq!(session.update(DT, &quit), SceneCommand::Quit);
    }

    #[test]
    fn hud_title_reports_level_hp_and_score() {
        let (_dir, mut session) = session(&[("level1", "P..")]);
        session.start_new_game();
        for _ in 0..60 {
            session.update(DT, &InputSnapshot::empty());
        }
        let title = session.debug_title().expect("title");
        assert!(title.contains("Level 1 | HP 100 | Score 0"), "{title}");
    }

    #[test]
    fn load_applies_master_volume() {
        let (_dir, mut session) = session(&[("level1", "P..")]);
        session.load();
        assert_eq!(session.audio.volume, 0.6);
    }

    #[test]
    fn player_input_reaches_the_level() {
        let (_dir, mut session) = session(&[("level1", "P...")]);
        session.start_new_game();
        let start = session.level().map(|level| level.player().body.pos);
        let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        session.update(DT, &right);
        let moved = session.level().map(|level| level.player().body.pos);
        assert_ne!(start, moved);
    }

    #[test]
    fn level_seeds_differ_per_index() {
        assert_ne!(level_seed(7, 0), level_seed(7, 1));
        assert_eq!(level_seed(7, 3), level_seed(7, 3));
    }

    #[test]
    fn sample_levels_validate() {
        let (_dir, session) = session(&[("level1", "P.^\n.XO\nBSbGL")]);
        assert!(session.validate_levels().is_ok());
    }
}
