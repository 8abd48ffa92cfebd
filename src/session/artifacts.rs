use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::playback::PlayableAudio;
use super::Channel;
use crate::error::Result;

/// Identifies the signal an artifact was written from.
///
/// Versions restart with every session, so the owning session's id is part
/// of the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArtifactStamp {
    pub session: u64,
    pub version: u64,
}

/// Materialized waveform containers for the playback collaborator.
///
/// Each file remembers the stamp it was written from; a path is only handed
/// out while that stamp is current.
#[derive(Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
    written: [Option<ArtifactStamp>; 2],
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: [None; 2],
        }
    }

    pub fn path(&self, channel: Channel) -> PathBuf {
        self.dir.join(channel.file_name())
    }

    pub fn is_fresh(&self, channel: Channel, stamp: ArtifactStamp) -> bool {
        self.written[channel.slot()] == Some(stamp)
    }

    /// Path of the artifact if it was written from `stamp`.
    pub fn fresh_path(&self, channel: Channel, stamp: ArtifactStamp) -> Option<PathBuf> {
        self.is_fresh(channel, stamp).then(|| self.path(channel))
    }

    /// Write `audio` unless the file on disk already holds `stamp`.
    pub fn refresh(
        &mut self,
        channel: Channel,
        stamp: ArtifactStamp,
        audio: &PlayableAudio,
    ) -> Result<PathBuf> {
        let path = self.path(channel);
        if self.is_fresh(channel, stamp) {
            return Ok(path);
        }
        write_wav_atomic(&path, audio)?;
        self.written[channel.slot()] = Some(stamp);
        log::info!(
            "Wrote {} (session {}, version {})",
            path.display(),
            stamp.session,
            stamp.version
        );
        Ok(path)
    }
}

/// 32-bit float mono WAV, written beside `path` and renamed over it.
///
/// A failed write drops the temporary file and leaves `path` untouched.
pub fn write_wav_atomic(path: &Path, audio: &PlayableAudio) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(tmp.path(), spec)?;
    for &sample in &audio.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn audio(samples: Vec<f32>) -> PlayableAudio {
        PlayableAudio {
            samples,
            sample_rate: 8000,
        }
    }

    #[test]
    fn writes_readable_float_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_wav_atomic(&path, &audio(vec![0.0, 0.5, -1.5, 2.0])).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.0, 0.5, -1.5, 2.0]);

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    fn stamp(session: u64, version: u64) -> ArtifactStamp {
        ArtifactStamp { session, version }
    }

    #[test]
    fn refresh_skips_current_version() {
        let dir = tempdir().unwrap();
        let mut store = ArtifactStore::new(dir.path());
        assert_eq!(store.fresh_path(Channel::Output, stamp(1, 1)), None);

        store.refresh(Channel::Output, stamp(1, 1), &audio(vec![0.1])).unwrap();
        assert!(store.is_fresh(Channel::Output, stamp(1, 1)));
        assert!(!store.is_fresh(Channel::Input, stamp(1, 1)));

        // Same stamp: file is not rewritten even if given different samples
        store.refresh(Channel::Output, stamp(1, 1), &audio(vec![0.9, 0.9])).unwrap();
        let reader = hound::WavReader::open(store.path(Channel::Output)).unwrap();
        assert_eq!(reader.len(), 1);

        store.refresh(Channel::Output, stamp(1, 2), &audio(vec![0.9, 0.9])).unwrap();
        let reader = hound::WavReader::open(store.path(Channel::Output)).unwrap();
        assert_eq!(reader.len(), 2);
        assert_eq!(store.fresh_path(Channel::Output, stamp(1, 1)), None);
    }

    #[test]
    fn same_version_from_another_session_is_stale() {
        let dir = tempdir().unwrap();
        let mut store = ArtifactStore::new(dir.path());
        store.refresh(Channel::Input, stamp(1, 1), &audio(vec![0.1])).unwrap();
        assert!(!store.is_fresh(Channel::Input, stamp(2, 1)));

        store.refresh(Channel::Input, stamp(2, 1), &audio(vec![0.2, 0.3, 0.4])).unwrap();
        let reader = hound::WavReader::open(store.path(Channel::Input)).unwrap();
        assert_eq!(reader.len(), 3);
    }

    #[test]
    fn failed_persist_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocked.wav");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("marker"), b"x").unwrap();

        assert!(write_wav_atomic(&blocker, &audio(vec![0.5])).is_err());
        assert!(blocker.is_dir());
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
