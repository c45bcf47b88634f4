//! Intermediate render results and their merge operators.
//!
//! Inline fragments carry at most one deferred whitespace character on each
//! side so that whitespace between siblings collapses without look-ahead.
//! Block fragments carry blank-line margins that collapse by `max`, the way
//! adjacent CSS margins do.

/// Run of inline text with deferred boundary whitespace.
///
/// `value == None` means the fragment is pure boundary whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InlineFragment {
    pub pre: Option<char>,
    pub value: Option<String>,
    pub post: Option<char>,
}

impl InlineFragment {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            pre: None,
            value: Some(value.into()),
            post: None,
        }
    }

    pub fn whitespace(ch: char) -> Self {
        Self {
            pre: Some(ch),
            value: None,
            post: None,
        }
    }

    /// Applies `f` to the value, leaving boundary whitespace untouched.
    pub fn map_value(self, f: impl FnOnce(String) -> String) -> Self {
        Self {
            value: self.value.map(f),
            ..self
        }
    }
}

/// Block of lines with blank-line margins above and below.
///
/// `value == None` is an empty block whose margins still propagate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BlockFragment {
    pub margin_top: usize,
    pub value: Option<String>,
    pub margin_bottom: usize,
}

impl BlockFragment {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            margin_top: 0,
            value: Some(value.into()),
            margin_bottom: 0,
        }
    }

    pub fn with_margins(mut self, top: usize, bottom: usize) -> Self {
        self.margin_top = top;
        self.margin_bottom = bottom;
        self
    }

    pub fn empty(top: usize, bottom: usize) -> Self {
        Self {
            margin_top: top,
            value: None,
            margin_bottom: bottom,
        }
    }

    pub fn map_value(self, f: impl FnOnce(String) -> String) -> Self {
        Self {
            value: self.value.map(f),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fragment {
    Inline(InlineFragment),
    Block(BlockFragment),
}

impl Fragment {
    pub fn is_block(&self) -> bool {
        matches!(self, Fragment::Block(_))
    }

    /// Plain text of the fragment with boundary whitespace dropped.
    pub fn into_text(self) -> Option<String> {
        match self {
            Fragment::Inline(inline) => inline.value,
            Fragment::Block(block) => block.value,
        }
    }
}

impl From<InlineFragment> for Fragment {
    fn from(value: InlineFragment) -> Self {
        Fragment::Inline(value)
    }
}

impl From<BlockFragment> for Fragment {
    fn from(value: BlockFragment) -> Self {
        Fragment::Block(value)
    }
}

pub fn merge_inline(
    a: Option<InlineFragment>,
    b: Option<InlineFragment>,
) -> Option<InlineFragment> {
    let (a, b) = match (a, b) {
        (None, None) => return None,
        (Some(a), None) => return Some(a),
        (None, Some(b)) => return Some(b),
        (Some(a), Some(b)) => (a, b),
    };

    match (a.value, b.value) {
        (value, None) => Some(InlineFragment {
            pre: a.pre,
            value,
            post: a.post.or(b.pre).or(b.post),
        }),
        (None, value) => Some(InlineFragment {
            pre: b.pre.or(a.post).or(a.pre),
            value,
            post: b.post,
        }),
        (Some(mut left), Some(right)) => {
            // Whitespace never follows a hard line break.
            if !left.ends_with('\n') {
                if let Some(space) = a.post.or(b.pre) {
                    left.push(space);
                }
            }
            left.push_str(&right);
            Some(InlineFragment {
                pre: a.pre,
                value: Some(left),
                post: b.post,
            })
        }
    }
}

pub fn merge_block(a: Option<BlockFragment>, b: Option<BlockFragment>) -> Option<BlockFragment> {
    let (a, b) = match (a, b) {
        (None, None) => return None,
        (Some(a), None) => return Some(a),
        (None, Some(b)) => return Some(b),
        (Some(a), Some(b)) => (a, b),
    };

    let merged = match (a.value, b.value) {
        (Some(mut top), Some(bottom)) => {
            let separator = a.margin_bottom.max(b.margin_top);
            top.push_str(&"\n".repeat(separator + 1));
            top.push_str(&bottom);
            BlockFragment {
                margin_top: a.margin_top,
                value: Some(top),
                margin_bottom: b.margin_bottom,
            }
        }
        (Some(top), None) => BlockFragment {
            margin_top: a.margin_top,
            value: Some(top),
            margin_bottom: a.margin_bottom.max(b.margin_top).max(b.margin_bottom),
        },
        (None, Some(bottom)) => BlockFragment {
            margin_top: a.margin_top.max(a.margin_bottom).max(b.margin_top),
            value: Some(bottom),
            margin_bottom: b.margin_bottom,
        },
        (None, None) => {
            let margin = a
                .margin_top
                .max(a.margin_bottom)
                .max(b.margin_top)
                .max(b.margin_bottom);
            BlockFragment::empty(margin, margin)
        }
    };

    Some(merged)
}
