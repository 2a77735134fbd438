use anyhow::{bail, Context, Result};
use api::{Detection, LandmarkSnapshot, LandmarkSource, ModuleLogger, SourceSettings};
use libloading::{Library, Symbol};
use log::{error, info, warn};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub struct LoadedSource {
    pub name: String,
    pub source: Box<dyn LandmarkSource>,
}

/// Loads every source plugin (`create_source` symbol) in `dir`.
///
/// Plugins that fail to load are logged and skipped.
pub fn load_native_sources(dir: &Path) -> Result<Vec<LoadedSource>> {
    let mut sources = Vec::new();

    if !dir.exists() {
        warn!("{:?} directory not found. Creating it.", dir);
        fs::create_dir_all(dir)?;
        return Ok(sources);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path
            .extension()
            .is_some_and(|ext| ext == "dll" || ext == "so" || ext == "dylib")
        {
            continue;
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!("Loading source plugin: {:?}", path);
        match load_plugin(&path) {
            Ok(source) => {
                info!("✓ Successfully loaded source: {}", filename);
                sources.push(LoadedSource {
                    name: filename,
                    source,
                });
            }
            Err(e) => error!("✗ Failed to load source {:?}: {}", path, e),
        }
    }

    Ok(sources)
}

fn load_plugin(path: &Path) -> Result<Box<dyn LandmarkSource>> {
    unsafe {
        let lib = Library::new(path)?;
        let func: Symbol<unsafe extern "C" fn() -> *mut dyn LandmarkSource> =
            lib.get(b"create_source")?;
        let raw = func();
        if raw.is_null() {
            bail!("create_source returned null");
        }
        // The plugin's code must stay mapped for as long as the source lives.
        std::mem::forget(lib);
        Ok(Box::from_raw(raw))
    }
}

/// Plays back recorded frames from a JSON-lines file, looping at the end.
///
/// Each line is a `LandmarkSnapshot`; a line with no points stands for a
/// frame without a face.
pub struct ReplaySource {
    path: PathBuf,
    frames: Vec<LandmarkSnapshot>,
    index: usize,
    logger: Option<ModuleLogger>,
}

impl ReplaySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frames: Vec::new(),
            index: 0,
            logger: None,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn read_frames(path: &Path) -> Result<Vec<LandmarkSnapshot>> {
        let file = fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let mut frames = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: LandmarkSnapshot = serde_json::from_str(&line)
                .with_context(|| format!("{:?} line {}: invalid frame", path, number + 1))?;
            frames.push(frame);
        }
        Ok(frames)
    }
}

impl LandmarkSource for ReplaySource {
    fn initialize(&mut self, logger: ModuleLogger, _settings: &SourceSettings) -> Result<()> {
        self.frames = Self::read_frames(&self.path)?;
        if self.frames.is_empty() {
            bail!("{:?} contains no frames", self.path);
        }
        logger.info(&format!("Replaying {} frames from {:?}", self.frames.len(), self.path));
        self.logger = Some(logger);
        Ok(())
    }

    fn update(&mut self, snapshot: &mut LandmarkSnapshot) -> Result<Detection> {
        let Some(frame) = self.frames.get(self.index) else {
            return Ok(Detection::Pending);
        };
        self.index = (self.index + 1) % self.frames.len();

        if frame.is_empty() {
            snapshot.timestamp_ms = frame.timestamp_ms;
            return Ok(Detection::NoFace);
        }
        snapshot.clone_from(frame);
        Ok(Detection::Face)
    }

    fn unload(&mut self) {
        if let Some(logger) = &self.logger {
            logger.info("Replay finished");
        }
        self.frames.clear();
    }
}
