//! Materialized path arithmetic for the category tree.
//!
//! A path is the concatenation of fixed-width segments, one per tree level.
//! Each segment is a base-N number written with the scheme's alphabet, so
//! plain string order of paths is the pre-order traversal of the tree and
//! ancestry is a string-prefix relation.

use thiserror::Error;

/// Base 36 alphabet, ascending in byte order.
pub const DEFAULT_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Characters per tree level.
pub const DEFAULT_STEP_LEN: usize = 4;
/// Width of the `categories.path` column.
pub const MAX_PATH_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// No further sibling can be encoded after the given parent path.
    #[error("no free path segment left under `{parent}`")]
    Exhausted { parent: String },
    /// Another level would not fit in the path column.
    #[error("path under `{parent}` would exceed {max_len} characters")]
    TooDeep { parent: String, max_len: usize },
    #[error("malformed path `{0}`")]
    Malformed(String),
    #[error("invalid path scheme: {0}")]
    InvalidScheme(&'static str),
}

/// Encoding parameters of a materialized path tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathScheme {
    alphabet: &'static str,
    step_len: usize,
    max_len: usize,
}

impl Default for PathScheme {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET,
            step_len: DEFAULT_STEP_LEN,
            max_len: MAX_PATH_LEN,
        }
    }
}

impl PathScheme {
    /// Build a scheme from an alphabet and a segment width.
    ///
    /// The alphabet must be ASCII alphanumeric, hold at least two characters
    /// and be strictly ascending so that string order equals numeric order.
    pub fn new(alphabet: &'static str, step_len: usize) -> Result<Self, PathError> {
        let bytes = alphabet.as_bytes();
        if bytes.len() < 2 {
            return Err(PathError::InvalidScheme("alphabet needs two or more characters"));
        }
        if !bytes.iter().all(u8::is_ascii_alphanumeric) {
            return Err(PathError::InvalidScheme("alphabet must be ASCII alphanumeric"));
        }
        if bytes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(PathError::InvalidScheme("alphabet must be strictly ascending"));
        }
        if step_len == 0 || step_len > MAX_PATH_LEN {
            return Err(PathError::InvalidScheme("step length out of range"));
        }
        // Keep segment arithmetic inside u64.
        let segment_space = u32::try_from(step_len)
            .ok()
            .and_then(|exponent| (bytes.len() as u64).checked_pow(exponent));
        if segment_space.is_none() {
            return Err(PathError::InvalidScheme("segment space does not fit in u64"));
        }

        Ok(Self {
            alphabet,
            step_len,
            max_len: MAX_PATH_LEN,
        })
    }

    /// Limit the total path length, which bounds the tree depth.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.max(self.step_len);
        self
    }

    pub fn step_len(&self) -> usize {
        self.step_len
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn max_depth(&self) -> usize {
        self.max_len / self.step_len
    }

    fn base(&self) -> u64 {
        self.alphabet.len() as u64
    }

    /// Largest value a segment can hold. Zero is never allocated.
    pub fn max_segment_value(&self) -> u64 {
        self.base().pow(self.step_len as u32) - 1
    }

    fn max_char(&self) -> char {
        self.alphabet
            .chars()
            .last()
            .unwrap_or_default()
    }

    pub fn encode_segment(&self, mut value: u64, parent: &str) -> Result<String, PathError> {
        if value == 0 || value > self.max_segment_value() {
            return Err(PathError::Exhausted {
                parent: parent.to_string(),
            });
        }

        let digits = self.alphabet.as_bytes();
        let mut segment = vec![digits[0]; self.step_len];
        for slot in segment.iter_mut().rev() {
            *slot = digits[(value % self.base()) as usize];
            value /= self.base();
        }

        Ok(segment.into_iter().map(char::from).collect())
    }

    pub fn decode_segment(&self, segment: &str) -> Result<u64, PathError> {
        if segment.len() != self.step_len {
            return Err(PathError::Malformed(segment.to_string()));
        }

        segment.chars().try_fold(0u64, |acc, ch| {
            let digit = self
                .alphabet
                .find(ch)
                .ok_or_else(|| PathError::Malformed(segment.to_string()))?;
            Ok(acc * self.base() + digit as u64)
        })
    }

    /// Check length and characters of a stored path.
    pub fn validate(&self, path: &str) -> Result<(), PathError> {
        if path.is_empty()
            || path.len() % self.step_len != 0
            || path.len() > self.max_len
            || !path.chars().all(|ch| self.alphabet.contains(ch))
        {
            return Err(PathError::Malformed(path.to_string()));
        }
        Ok(())
    }

    /// Depth implied by the path length; roots have depth 1.
    pub fn depth_of(&self, path: &str) -> Result<i32, PathError> {
        self.validate(path)?;
        Ok((path.len() / self.step_len) as i32)
    }

    /// Path of the parent node, `None` for roots.
    pub fn parent_of<'a>(&self, path: &'a str) -> Option<&'a str> {
        if path.len() <= self.step_len {
            None
        } else {
            path.get(..path.len() - self.step_len)
        }
    }

    /// Proper prefixes of `path` at every segment boundary, root first.
    pub fn ancestors_of<'a>(&self, path: &'a str) -> Vec<&'a str> {
        (1..path.len() / self.step_len)
            .filter_map(|level| path.get(..level * self.step_len))
            .collect()
    }

    pub fn is_descendant_of(&self, path: &str, ancestor: &str) -> bool {
        path.len() > ancestor.len() && path.starts_with(ancestor)
    }

    /// Path allocated for the next child of `parent` (or the next root when
    /// `parent` is `None`), given the last existing child path, if any.
    pub fn next_child(
        &self,
        parent: Option<&str>,
        last_child: Option<&str>,
    ) -> Result<String, PathError> {
        let prefix = parent.unwrap_or_default();
        if prefix.len() + self.step_len > self.max_len {
            return Err(PathError::TooDeep {
                parent: prefix.to_string(),
                max_len: self.max_len,
            });
        }

        let next_value = match last_child {
            Some(last) => {
                let segment = last
                    .get(prefix.len()..)
                    .filter(|segment| last.starts_with(prefix) && segment.len() == self.step_len)
                    .ok_or_else(|| PathError::Malformed(last.to_string()))?;
                self.decode_segment(segment)? + 1
            }
            None => 1,
        };

        let segment = self.encode_segment(next_value, prefix)?;
        Ok(format!("{prefix}{segment}"))
    }

    /// Inclusive upper bound of the subtree rooted at `path` for a
    /// `BETWEEN path AND bound` range scan.
    pub fn subtree_upper_bound(&self, path: &str) -> String {
        let padding = self.max_len.saturating_sub(path.len());
        let mut bound = String::with_capacity(path.len() + padding);
        bound.push_str(path);
        bound.extend(std::iter::repeat_n(self.max_char(), padding));
        bound
    }

    /// Replace the `old_prefix` of `path` with `new_prefix`.
    pub fn rebase(&self, path: &str, old_prefix: &str, new_prefix: &str) -> Result<String, PathError> {
        let rest = path
            .strip_prefix(old_prefix)
            .ok_or_else(|| PathError::Malformed(path.to_string()))?;
        let rebased = format!("{new_prefix}{rest}");
        if rebased.len() > self.max_len {
            return Err(PathError::TooDeep {
                parent: new_prefix.to_string(),
                max_len: self.max_len,
            });
        }
        Ok(rebased)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scheme_allocates_fixed_width_segments() {
        let scheme = PathScheme::default();

        let first_root = scheme.next_child(None, None).unwrap();
        assert_eq!(first_root, "0001");

        let second_root = scheme.next_child(None, Some(&first_root)).unwrap();
        assert_eq!(second_root, "0002");

        let child = scheme.next_child(Some("0002"), None).unwrap();
        assert_eq!(child, "00020001");

        let after_nine = scheme.next_child(Some("0002"), Some("00020009")).unwrap();
        assert_eq!(after_nine, "0002000A");
        let after_z = scheme.next_child(None, Some("000Z")).unwrap();
        assert_eq!(after_z, "0010");
    }

    #[test]
    fn string_order_matches_segment_order() {
        let scheme = PathScheme::default();
        let mut previous = scheme.encode_segment(1, "").unwrap();
        for value in 2..2000 {
            let current = scheme.encode_segment(value, "").unwrap();
            assert!(previous < current, "{previous} !< {current}");
            assert_eq!(scheme.decode_segment(&current).unwrap(), value);
            previous = current;
        }
    }

    #[test]
    fn exhausted_segment_space_is_reported() {
        let scheme = PathScheme::new("01", 2).unwrap();
        assert_eq!(scheme.max_segment_value(), 3);

        let last = scheme.next_child(Some("01"), Some("0110")).unwrap();
        assert_eq!(last, "0111");

        let err = scheme.next_child(Some("01"), Some("0111")).unwrap_err();
        assert_eq!(
            err,
            PathError::Exhausted {
                parent: "01".to_string()
            }
        );
    }

    #[test]
    fn widest_binary_scheme_fits_in_u64() {
        let scheme = PathScheme::new("01", 63).unwrap();
        assert_eq!(scheme.max_segment_value(), (1u64 << 63) - 1);
    }

    #[test]
    fn depth_is_bounded_by_max_len() {
        let scheme = PathScheme::new("0123456789", 2).unwrap().with_max_len(4);
        assert_eq!(scheme.max_depth(), 2);
        assert!(scheme.next_child(Some("01"), None).is_ok());
        assert!(matches!(
            scheme.next_child(Some("0101"), None),
            Err(PathError::TooDeep { max_len: 4, .. })
        ));
    }

    #[test]
    fn ancestors_are_proper_prefixes_root_first() {
        let scheme = PathScheme::default();
        let path = "000100020003";

        assert_eq!(scheme.ancestors_of(path), vec!["0001", "00010002"]);
        assert!(scheme.ancestors_of("0001").is_empty());
        assert_eq!(scheme.parent_of(path), Some("00010002"));
        assert_eq!(scheme.parent_of("0001"), None);
        assert_eq!(scheme.depth_of(path), Ok(3));
        assert!(scheme.is_descendant_of(path, "0001"));
        assert!(!scheme.is_descendant_of("0001", "0001"));
    }

    #[test]
    fn subtree_bound_covers_deep_descendants_only() {
        let scheme = PathScheme::default().with_max_len(12);
        let bound = scheme.subtree_upper_bound("0001");
        assert_eq!(bound, "0001ZZZZZZZZ");

        assert!("0001ZZZZ0001".as_bytes() <= bound.as_bytes());
        assert!("00010001" > "0001" && "00010001" <= bound.as_str());
        assert!("0002" > bound.as_str());
    }

    #[test]
    fn rebase_swaps_prefix() {
        let scheme = PathScheme::default();
        assert_eq!(
            scheme.rebase("000100020003", "00010002", "0005").unwrap(),
            "00050003"
        );
        assert!(scheme.rebase("0002", "0001", "0005").is_err());
    }

    #[test]
    fn rejects_bad_schemes_and_paths() {
        assert!(PathScheme::new("0", 4).is_err());
        assert!(PathScheme::new("10", 4).is_err());
        assert!(PathScheme::new("0%", 4).is_err());
        assert!(PathScheme::new("01", 0).is_err());
        assert!(PathScheme::new("01", 64).is_err());
        assert!(PathScheme::new(DEFAULT_ALPHABET, 13).is_err());

        let scheme = PathScheme::default();
        assert!(scheme.validate("001").is_err());
        assert!(scheme.validate("00a1").is_err());
        assert!(scheme.validate("").is_err());
        assert!(scheme.validate("0001").is_ok());
    }
}
