use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::error::{CanvasError, CanvasResult};
use crate::surface::RasterSurface;

/// Default cap on the number of snapshots kept for undo
pub const MAX_HISTORY: usize = 20;

/// An encoded snapshot of the whole visible surface
#[derive(Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    bytes: Arc<[u8]>,
    size: [u32; 2],
}

impl std::fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("size", &self.size)
            .field("bytes", &format!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

impl HistoryEntry {
    /// Encode a captured frame as PNG
    pub fn encode(frame: &RgbaImage) -> CanvasResult<Self> {
        let mut buffer = Cursor::new(Vec::new());
        frame.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(Self {
            bytes: buffer.into_inner().into(),
            size: [frame.width(), frame.height()],
        })
    }

    /// Wrap already-encoded bytes, e.g. a snapshot produced elsewhere
    pub fn from_bytes(bytes: Vec<u8>, size: [u32; 2]) -> Self {
        Self {
            bytes: bytes.into(),
            size,
        }
    }

    pub fn decode(&self) -> CanvasResult<RgbaImage> {
        let frame = image::load_from_memory_with_format(&self.bytes, ImageFormat::Png)?.into_rgba8();
        let actual = [frame.width(), frame.height()];
        if actual != self.size {
            return Err(CanvasError::SizeMismatch {
                expected: self.size,
                actual,
            });
        }
        Ok(frame)
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }
}

/// Work that completes after the call that scheduled it
enum Deferred {
    /// Reset history to a single blank-canvas entry
    Seed(RgbaImage),
    /// Append a captured frame, discarding any undone future
    Commit(RgbaImage),
    /// Step back one entry and paint it onto the surface. The target is
    /// chosen when this runs, after any commit queued ahead of it.
    Undo,
}

/// Bounded, linear history of full-surface snapshots.
///
/// Frames are captured synchronously but encoded, appended and restored later
/// by [`HistoryManager::settle`]. Until then [`HistoryManager::can_undo`] may
/// report a stale value.
pub struct HistoryManager {
    entries: Vec<HistoryEntry>,
    /// Index of the entry matching what the surface currently shows
    current_index: Option<usize>,
    max_entries: usize,
    pending: VecDeque<Deferred>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl HistoryManager {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            current_index: None,
            max_entries: max_entries.max(1),
            pending: VecDeque::new(),
        }
    }

    /// Schedule recording the surface as the initial blank state
    pub fn seed(&mut self, surface: &RasterSurface) {
        self.pending.push_back(Deferred::Seed(surface.pixels().clone()));
    }

    /// Capture the surface now and schedule appending it
    pub fn commit(&mut self, surface: &RasterSurface) {
        self.pending.push_back(Deferred::Commit(surface.pixels().clone()));
    }

    /// Schedule stepping back one entry.
    ///
    /// Returns false, scheduling nothing, when there is no earlier entry and
    /// no queued work that could create one.
    pub fn undo(&mut self) -> bool {
        if self.pending.is_empty() && !self.can_undo() {
            return false;
        }
        self.pending.push_back(Deferred::Undo);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.current_index.is_some_and(|i| i > 0)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.current_index.and_then(|i| self.entries.get(i))
    }

    /// Run every scheduled operation in order.
    ///
    /// `on_settled` is called after each one completes, so listeners see the
    /// undo state as it stands after that step.
    pub fn settle(&mut self, surface: &mut RasterSurface, mut on_settled: impl FnMut(&Self)) -> usize {
        let mut completed = 0;
        while let Some(work) = self.pending.pop_front() {
            match work {
                Deferred::Seed(frame) => self.apply_seed(&frame),
                Deferred::Commit(frame) => self.apply_commit(&frame),
                Deferred::Undo => self.apply_undo(surface),
            }
            completed += 1;
            on_settled(self);
        }
        completed
    }

    fn apply_seed(&mut self, frame: &RgbaImage) {
        match HistoryEntry::encode(frame) {
            Ok(entry) => {
                log::debug!("History seeded with blank {:?}", entry);
                self.entries = vec![entry];
                self.current_index = Some(0);
            }
            Err(err) => log::error!("Failed to encode initial snapshot: {}", err),
        }
    }

    fn apply_commit(&mut self, frame: &RgbaImage) {
        let entry = match HistoryEntry::encode(frame) {
            Ok(entry) => entry,
            Err(err) => {
                log::error!("Failed to encode snapshot, commit dropped: {}", err);
                return;
            }
        };

        // Anything after the current entry was undone and is now unreachable
        if let Some(index) = self.current_index {
            self.entries.truncate(index + 1);
        }
        self.entries.push(entry);

        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
        self.current_index = Some(self.entries.len() - 1);
        log::debug!(
            "Committed snapshot {} of {}",
            self.entries.len(),
            self.max_entries
        );
    }

    fn apply_undo(&mut self, surface: &mut RasterSurface) {
        let Some(target) = self.current_index.filter(|i| *i > 0).map(|i| i - 1) else {
            log::debug!("Undo settled with nothing earlier to restore");
            return;
        };
        let Some(entry) = self.entries.get(target) else {
            return;
        };
        match entry.decode().and_then(|frame| surface.replace_pixels(frame)) {
            Ok(()) => self.current_index = Some(target),
            Err(err) => log::error!("Failed to restore snapshot, keeping current pixels: {}", err),
        }
    }
}
