use gix::{
    bstr::{BString, ByteSlice},
    glob::wildmatch,
};

// Bits of gix::ignore::search::pattern::Mode, which gix keeps private.
const MODE_NO_SUB_DIR: u32 = 1 << 0;
const MODE_MUST_MATCH_DIR: u32 = 1 << 2;
const MODE_NEGATIVE: u32 = 1 << 3;
const MODE_ABSOLUTE: u32 = 1 << 4;

/// One parsed `.gitignore` line.
struct Pattern {
    text: BString,
    /// Match the basename only (no internal slash, not anchored).
    basename: bool,
    dir_only: bool,
    negative: bool,
}

impl Pattern {
    fn from_mode(text: BString, mode: u32) -> Self {
        let anchored = mode & MODE_ABSOLUTE != 0;
        let no_sub_dir = mode & MODE_NO_SUB_DIR != 0;
        Self {
            text,
            basename: no_sub_dir && !anchored,
            dir_only: mode & MODE_MUST_MATCH_DIR != 0,
            negative: mode & MODE_NEGATIVE != 0,
        }
    }

    fn is_match(&self, path: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        let subject = if self.basename {
            path.rsplit_once('/').map_or(path, |(_, name)| name)
        } else {
            path
        };
        wildmatch(
            self.text.as_bstr(),
            subject.into(),
            wildmatch::Mode::NO_MATCH_SLASH_LITERAL,
        )
    }
}

/// Matches output-relative paths against `.gitignore` rules.
///
/// Last matching pattern wins; `!pattern` re-includes.
pub struct IgnoreMatcher {
    patterns: Vec<Pattern>,
}

impl IgnoreMatcher {
    pub fn new(gitignore: &[u8]) -> Self {
        let patterns = gix::ignore::parse(gitignore, true)
            .map(|(pattern, _, _)| Pattern::from_mode(pattern.text, pattern.mode.bits()))
            .collect();
        Self { patterns }
    }

    /// `path` is `/`-separated and relative to the repository root.
    pub fn matches(&self, path: &str, is_dir: bool) -> bool {
        self.patterns
            .iter()
            .rev()
            .find(|pattern| pattern.is_match(path, is_dir))
            .is_some_and(|pattern| !pattern.negative)
    }
}
