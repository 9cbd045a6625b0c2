//! `TagExpr` — the immutable, chainable tag-expression builder.
//!
//! A `TagExpr` pairs a derived [`TagId`] with the canonical UTF-8 form of the
//! expression that produced it. Builders are persistent values: every
//! [`TagExpr::with`] returns a new builder and leaves the receiver untouched,
//! so shared prefixes (`attr`, `cell-property`, ...) can fan out into many
//! children safely.
//!
//! Two operator classes structure an expression:
//!
//! - With (`.` and friends) — commutative summation; terms joined by With are
//!   order independent: `a.b.cc == b.a.cc == a.cc.b != a.cC.b`.
//! - Then (`-` and friends) — non-commutative: `a-b != b-a`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TagId;
use crate::error::TagError;
use crate::hash::term_id;

/// Canonical With operator, the commutative (ADD-like) delimiter.
pub const CANONIC_WITH: char = '.';

/// Canonical Then operator, the non-commutative delimiter.
pub const CANONIC_THEN: char = '-';

/// Commutative delimiter class: `.` `+` whitespace `,` `:` `!` `?`
const fn is_with_delimiter(c: u8) -> bool {
    matches!(
        c,
        b'.' | b'+' | b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c | b',' | b':' | b'!' | b'?'
    )
}

/// Non-commutative delimiter class: `-` `/` `\` `~` `^` `@`
const fn is_then_delimiter(c: u8) -> bool {
    matches!(c, b'-' | b'/' | b'\\' | b'~' | b'^' | b'@')
}

/// Immutable tag expression: a derived [`TagId`] plus the canonical
/// expression string it was derived from.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagExpr {
    id: TagId,
    canonic: String,
}

/// Historical alias; `TagSpec` and `TagExpr` are the same abstraction.
pub type TagSpec = TagExpr;

impl TagExpr {
    /// The empty (nil) expression, the root every path extends from.
    pub fn new() -> Self {
        Self::default()
    }

    /// One-step constructor: `TagExpr::new().with(expr)`.
    pub fn from_expr(expr: &str) -> Self {
        Self::new().with(expr)
    }

    /// Strict one-step constructor; see [`TagExpr::try_with`].
    pub fn parse(expr: &str) -> Result<Self, TagError> {
        Self::new().try_with(expr)
    }

    /// The derived identifier of this expression.
    pub const fn id(&self) -> TagId {
        self.id
    }

    /// The canonical expression string: `({operator}{term})...` with the
    /// leading With operator omitted.
    pub fn canonic(&self) -> &str {
        &self.canonic
    }

    pub fn is_empty(&self) -> bool {
        self.canonic.is_empty()
    }

    /// Returns a new expression extending this one; the receiver is
    /// unaffected.
    ///
    /// The input is canonicalized: delimiter runs collapse to a single With
    /// or Then operator (Then wins within a run), empty terms are skipped,
    /// and each term is ASCII-lowercased when it is a single character or
    /// already contains a lowercase letter (ALL-CAPS terms are preserved).
    pub fn with(&self, expr: &str) -> TagExpr {
        let bytes = expr.as_bytes();
        let n = bytes.len();

        let mut id = self.id;
        let mut canonic = String::with_capacity(self.canonic.len() + expr.len());
        canonic.push_str(&self.canonic);

        let mut i = 0;
        while i < n {
            // extract operator: a run of delimiters, Then dominating
            let mut op = CANONIC_WITH;
            while i < n {
                let c = bytes[i];
                if is_then_delimiter(c) {
                    op = CANONIC_THEN;
                } else if !is_with_delimiter(c) {
                    break;
                }
                i += 1;
            }

            // find end of term
            let start = i;
            let mut lower_count = 0;
            while i < n {
                let c = bytes[i];
                if is_with_delimiter(c) || is_then_delimiter(c) {
                    break;
                }
                if c.is_ascii_lowercase() {
                    lower_count += 1;
                }
                i += 1;
            }
            if i == start {
                continue; // skip empty terms
            }

            // Delimiters are ASCII, so these byte offsets are char boundaries.
            let raw = &expr[start..i];

            // lower-case is canonic unless the term is ALL-CAPS (and longer
            // than one character)
            let fold = raw.len() == 1 || lower_count > 0;

            if !canonic.is_empty() || op != CANONIC_WITH {
                canonic.push(op);
            }
            if fold {
                let lowered = raw.to_ascii_lowercase();
                id = combine(id, op, term_id(lowered.as_bytes()));
                canonic.push_str(&lowered);
            } else {
                id = combine(id, op, term_id(raw.as_bytes()));
                canonic.push_str(raw);
            }
        }

        TagExpr { id, canonic }
    }

    /// Strict variant of [`TagExpr::with`]: fails with
    /// [`TagError::InvalidSegment`] when the input contributes no valid term.
    ///
    /// Registration paths use this so a malformed declaration aborts startup
    /// instead of silently registering the unchanged prefix.
    pub fn try_with(&self, expr: &str) -> Result<TagExpr, TagError> {
        let next = self.with(expr);
        if next.canonic == self.canonic {
            return Err(TagError::InvalidSegment {
                expr: expr.to_owned(),
            });
        }
        Ok(next)
    }

    /// Splits the canonic expression `n` tags from the right.
    ///
    /// E.g. `leaf_tags(2)` on `"a.b.c.d.ee"` yields `("a.b.c", "d.ee")`.
    /// A leading With operator is omitted from the suffix; a Then operator is
    /// kept, since it is structural.
    pub fn leaf_tags(&self, n: usize) -> (&str, &str) {
        if n == 0 {
            return (&self.canonic, "");
        }

        let bytes = self.canonic.as_bytes();
        let mut remaining = n;
        for p in (0..bytes.len()).rev() {
            let c = bytes[p];
            if c == b'.' || c == b'-' {
                remaining -= 1;
                if remaining == 0 {
                    let prefix = &self.canonic[..p];
                    let suffix_at = if c == b'.' { p + 1 } else { p };
                    return (prefix, &self.canonic[suffix_at..]);
                }
            }
        }
        ("", &self.canonic)
    }

    /// Internal constructor for pre-resolved parts; test and registry use.
    pub(crate) fn from_parts(id: TagId, canonic: String) -> Self {
        TagExpr { id, canonic }
    }
}

const fn combine(id: TagId, op: char, term: TagId) -> TagId {
    match op {
        CANONIC_THEN => id.then(term),
        _ => id.with(term),
    }
}

impl fmt::Display for TagExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{expr_id, token_id};

    #[test]
    fn canonicalizes_messy_delimiters() {
        let amp_app = TagExpr::new().with("..amp+.app.");
        assert_eq!(amp_app.canonic(), "amp.app");
        assert_eq!(amp_app.id(), expr_id(".amp...").with_token("app"));

        let same = TagExpr::from_expr("amp...").with("app");
        assert_eq!(same, amp_app);
    }

    #[test]
    fn with_and_then_operators() {
        let expr = TagExpr::from_expr("amp.app").with("some-tag+thing");
        assert_eq!(expr.canonic(), "amp.app.some-tag.thing");
        assert_eq!(
            expr.id(),
            expr_id("amp.app").with_expr("some-tag").with_token("thing")
        );
        // Then is non-commutative
        assert_ne!(expr_id("some-tag"), expr_id("tag-some"));
    }

    #[test]
    fn with_terms_commute() {
        assert_eq!(expr_id("a.b.cc"), expr_id("b.cc.a"));
        assert_eq!(expr_id("a.b.cc"), expr_id("a.cc.b"));
        assert_ne!(expr_id("a.b.cc"), expr_id("a.cC.b"));
        assert_eq!(
            TagExpr::from_expr("b.cc.a").canonic(),
            "b.cc.a" // canonic keeps written order; only the ID commutes
        );
    }

    #[test]
    fn case_folding_rules() {
        // contains lowercase -> folded
        assert_eq!(TagExpr::from_expr("Tag.text").canonic(), "tag.text");
        // single character -> folded
        assert_eq!(TagExpr::from_expr("X").canonic(), "x");
        // ALL-CAPS multi-char -> preserved
        assert_eq!(TagExpr::from_expr("HTTP").canonic(), "HTTP");
        assert_ne!(expr_id("HTTP"), expr_id("http"));
    }

    #[test]
    fn builders_are_persistent() {
        let a = TagExpr::from_expr("amp").with("attr");
        let before = a.clone();

        let b1 = a.with("children.TagID");
        let b2 = a.with("cell-properties");

        assert_ne!(b1.id(), b2.id());
        assert_eq!(a, before, "prefix must be unaffected by derivation");
        assert_eq!(a.id(), before.id());
    }

    #[test]
    fn determinism_across_construction_paths() {
        let direct = TagExpr::from_expr("amp.attr.cell-properties");
        let chained = TagExpr::from_expr("amp").with("attr").with("cell-properties");
        assert_eq!(direct, chained);
        assert_eq!(direct.id(), chained.id());
    }

    #[test]
    fn try_with_rejects_empty_input() {
        let base = TagExpr::from_expr("amp");
        assert!(matches!(
            base.try_with(""),
            Err(TagError::InvalidSegment { .. })
        ));
        assert!(matches!(
            base.try_with("..+  .."),
            Err(TagError::InvalidSegment { .. })
        ));
        assert!(base.try_with("attr").is_ok());
    }

    #[test]
    fn empty_expression_is_nil() {
        let nil = TagExpr::new();
        assert!(nil.is_empty());
        assert!(nil.id().is_nil());
        assert_eq!(nil.canonic(), "");
    }

    #[test]
    fn leaf_tags_splits_from_the_right() {
        let expr = TagExpr::from_expr("amp.app").with("some-tag+thing");
        assert_eq!(expr.leaf_tags(2), ("amp.app.some", "-tag.thing"));
        assert_eq!(expr.leaf_tags(1), ("amp.app.some-tag", "thing"));
        assert_eq!(expr.leaf_tags(0), ("amp.app.some-tag.thing", ""));
        assert_eq!(expr.leaf_tags(9), ("", "amp.app.some-tag.thing"));
    }

    #[test]
    fn non_ascii_terms_pass_through() {
        let expr = TagExpr::from_expr("amp.héllo");
        assert_eq!(expr.canonic(), "amp.héllo");
        assert_eq!(expr.id(), token_id("amp").with(token_id("héllo")));
    }

    #[test]
    fn display_is_canonic() {
        let expr = TagExpr::from_expr("amp").with("attr");
        assert_eq!(expr.to_string(), "amp.attr");
    }
}
