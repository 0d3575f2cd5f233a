/// A single playable item. Only `uri` is required to drive a graph; the rest
/// is carried through for notifications (`on_metadata`) and printing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistItem {
    pub uri: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl PlaylistItem {
    pub fn new(uri: impl Into<String>) -> Self {
        PlaylistItem {
            uri: uri.into(),
            title: None,
            artist: None,
            album: None,
        }
    }
}

/// Sentinel for "no current position", mirroring the original's
/// `INVALID_POSITION`.
pub const INVALID_POSITION: i64 = -1;

/// Default skip distance when none has been explicitly requested.
pub const SKIP_DEFAULT_VALUE: i64 = 1;

/// Ordered list of items plus a cursor. `position` is `INVALID_POSITION`
/// before the first `do_load`/`do_skip` has picked a starting track.
#[derive(Clone, Debug, Default)]
pub struct Playlist {
    items: Vec<PlaylistItem>,
    position: i64,
}

impl Playlist {
    pub fn new(items: Vec<PlaylistItem>) -> Self {
        Playlist {
            items,
            position: INVALID_POSITION,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn current(&self) -> Option<&PlaylistItem> {
        if self.position < 0 {
            return None;
        }
        self.items.get(self.position as usize)
    }

    pub fn append(&mut self, items: impl IntoIterator<Item = PlaylistItem>) {
        self.items.extend(items);
    }

    /// Picks the first item as the starting position, if none has been
    /// picked yet and the playlist isn't empty. Called once a playlist is
    /// handed to a graph that's about to configure its source component.
    pub fn seed_start(&mut self) {
        if self.position == INVALID_POSITION && !self.items.is_empty() {
            self.position = 0;
        }
    }

    /// Whether applying `jump` to the current position would leave the
    /// playlist's valid index range, i.e. whether this skip ends playback.
    pub fn is_end_of_play(&self, jump: i64) -> bool {
        let next = self.position + jump;
        next < 0 || next >= self.items.len() as i64
    }

    /// Applies `jump` to the cursor. Callers must have checked
    /// `!is_end_of_play(jump)` first; out-of-range jumps clamp instead of
    /// panicking so a misused call degrades rather than corrupts state.
    pub fn apply_skip(&mut self, jump: i64) {
        let next = (self.position + jump).clamp(0, self.items.len().saturating_sub(1) as i64);
        self.position = next;
    }

    pub fn items(&self) -> &[PlaylistItem] {
        &self.items
    }
}
