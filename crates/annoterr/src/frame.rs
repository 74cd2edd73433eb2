//! Call-stack snapshots.
//!
//! [`SystemFrames`] walks the real stack with the `backtrace` crate and
//! resolves each return address to function, file and line. Anything that
//! does not resolve to a function name is dropped, as are the frames of the
//! capture machinery itself, so the first frame is whoever called
//! `AnnotatedError::new` (or `?`-converted into one).
//!
//! [`FixedFrames`] hands back a canned list; use it to construct errors with
//! a known trace in tests.

use std::fmt;

/// One resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Demangled function path, without the symbol hash.
    pub function: String,
    /// Source file, or [`UNKNOWN_FILE`] without debug info.
    pub file: String,
    /// Source line, `0` when unknown.
    pub line: u32,
}

/// File placeholder for frames resolved without debug info.
pub const UNKNOWN_FILE: &str = "<unknown>";

impl Frame {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }
}

/// Two lines, as they appear under `Stack:` in a rendered error (no trailing newline).
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\t{}\n\t\t at {}:{}", self.function, self.file, self.line)
    }
}

/// Something that can produce a stack snapshot.
pub trait FrameSource {
    /// Innermost frame first, at most `max_frames` entries.
    fn capture(&self, max_frames: usize) -> Vec<Frame>;
}

/// The real call stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFrames;

impl FrameSource for SystemFrames {
    #[inline(never)]
    fn capture(&self, max_frames: usize) -> Vec<Frame> {
        if max_frames == 0 {
            return Vec::new();
        }
        walk(max_frames)
    }
}

/// A fixed trace.
#[derive(Debug, Clone, Default)]
pub struct FixedFrames(pub Vec<Frame>);

impl FrameSource for FixedFrames {
    fn capture(&self, max_frames: usize) -> Vec<Frame> {
        self.0.iter().take(max_frames).cloned().collect()
    }
}

// Extra raw frames walked beyond the bound to make room for the ones
// trimmed off the top.
#[cfg_attr(not(feature = "backtrace"), allow(dead_code))]
const CAPTURE_SLACK: usize = 32;

// Capture-machinery frames are only searched for near the top of the stack.
#[cfg_attr(not(feature = "backtrace"), allow(dead_code))]
const SCAN_WINDOW: usize = 64;

// The stack walk itself.
#[cfg_attr(not(feature = "backtrace"), allow(dead_code))]
const WALK_PREFIXES: &[&str] = &[
    "backtrace::",
    "<backtrace::",
    "annoterr::frame::walk",
    "<annoterr::frame::SystemFrames as ",
];

// Between the walk and the code that asked for an error.
#[cfg_attr(not(feature = "backtrace"), allow(dead_code))]
const ENTRY_PREFIXES: &[&str] = &[
    "annoterr::error::AnnotatedError::",
    "<annoterr::error::AnnotatedError as ",
];

#[cfg_attr(not(feature = "backtrace"), allow(dead_code))]
fn is_walk(function: &str) -> bool {
    WALK_PREFIXES.iter().any(|p| function.starts_with(p))
}

#[cfg_attr(not(feature = "backtrace"), allow(dead_code))]
fn is_entry(function: &str) -> bool {
    ENTRY_PREFIXES.iter().any(|p| function.starts_with(p))
        || function.contains(" as annoterr::convert::ResultExt")
        // `?` reaches `From::from` through this
        || function.contains(" as core::ops::try_trait::FromResidual")
}

/// Number of leading frames that belong to the capture path.
///
/// The cut starts after the last stack-walk frame near the top (or at the
/// first entry frame when no walk frame resolved) and then runs only over
/// the contiguous entry frames that follow. Conversion frames further down,
/// past the first caller frame, are kept.
#[cfg_attr(not(feature = "backtrace"), allow(dead_code))]
fn internal_prefix_len(frames: &[Frame]) -> usize {
    let window = &frames[..frames.len().min(SCAN_WINDOW)];
    let start = match window.iter().rposition(|f| is_walk(&f.function)) {
        Some(i) => i + 1,
        None => match window.iter().position(|f| is_entry(&f.function)) {
            Some(i) => i,
            None => return 0,
        },
    };
    let entry = frames[start..]
        .iter()
        .take_while(|f| is_entry(&f.function))
        .count();
    start + entry
}

cfg_if::cfg_if! {
    if #[cfg(feature = "backtrace")] {
        #[inline(never)]
        fn walk(max_frames: usize) -> Vec<Frame> {
            let limit = max_frames.saturating_add(CAPTURE_SLACK);
            let mut raw = Vec::new();
            backtrace::trace(|frame| {
                raw.push(frame.clone());
                raw.len() < limit
            });

            let mut frames = Vec::with_capacity(raw.len());
            for frame in &raw {
                backtrace::resolve_frame(frame, |symbol| {
                    if let Some(resolved) = resolve(symbol) {
                        frames.push(resolved);
                    }
                });
            }

            let skip = internal_prefix_len(&frames);
            frames.drain(..skip);
            frames.truncate(max_frames);
            frames
        }

        fn resolve(symbol: &backtrace::Symbol) -> Option<Frame> {
            // `{:#}` drops the trailing `::h<hash>`.
            let function = format!("{:#}", symbol.name()?);
            if function.is_empty() {
                return None;
            }
            let file = symbol
                .filename()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| UNKNOWN_FILE.to_string());
            Some(Frame {
                function,
                file,
                line: symbol.lineno().unwrap_or(0),
            })
        }
    } else {
        fn walk(_max_frames: usize) -> Vec<Frame> {
            Vec::new()
        }
    }
}
