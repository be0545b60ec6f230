use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum AudioCue {
    Jump,
    Swing,
    PlayerHurt,
    EnemyKilled,
    LevelCleared,
    GameOver,
}

impl AudioCue {
    /// File stem under the sound directory.
    pub(crate) fn sound_id(self) -> &'static str {
        match self {
            AudioCue::Jump => "jump",
            AudioCue::Swing => "punch",
            AudioCue::PlayerHurt => "hurt",
            AudioCue::EnemyKilled => "enemy_down",
            AudioCue::LevelCleared => "level_clear",
            AudioCue::GameOver => "game_over",
        }
    }
}

pub(crate) trait AudioSink {
    fn play(&mut self, cue: AudioCue);
    fn set_master_volume(&mut self, volume: f32);
}

pub(crate) fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Sink without an output device: cues become debug events.
#[derive(Debug)]
pub(crate) struct TracingAudio {
    volume: f32,
}

impl TracingAudio {
    pub(crate) fn new(volume: f32) -> Self {
        Self {
            volume: clamp_volume(volume),
        }
    }
}

impl AudioSink for TracingAudio {
    fn play(&mut self, cue: AudioCue) {
        if self.volume <= 0.0 {
            return;
        }
        debug!(sound = cue.sound_id(), volume = self.volume, "sound_played");
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
        debug!(volume = self.volume, "master_volume_set");
    }
}

/// Records cues in order; used by simulation tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingAudio {
    pub(crate) cues: Vec<AudioCue>,
    pub(crate) volume: f32,
}

#[cfg(test)]
impl RecordingAudio {
    pub(crate) fn count(&self, cue: AudioCue) -> usize {
        self.cues.iter().filter(|played| **played == cue).count()
    }
}

#[cfg(test)]
impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_clamped_to_unit_range() {
        assert_eq!(clamp_volume(1.5), 1.0);
        assert_eq!(clamp_volume(-0.2), 0.0);
        assert_eq!(clamp_volume(f32::NAN), 0.0);
        assert_eq!(clamp_volume(0.6), 0.6);
    }

    #[test]
    fn tracing_sink_tracks_volume() {
        let mut audio = TracingAudio::new(3.0);
        assert_eq!(audio.volume, 1.0);
        audio.set_master_volume(0.25);
        assert_eq!(audio.volume, 0.25);
        audio.play(AudioCue::Jump);
    }

    #[test]
    fn recording_sink_counts_cues() {
        let mut audio = RecordingAudio::default();
        audio.play(AudioCue::Jump);
        audio.play(AudioCue::Jump);
        audio.play(AudioCue::GameOver);
        assert_eq!(audio.count(AudioCue::Jump), 2);
        assert_eq!(audio.count(AudioCue::Swing), 0);
    }
}
