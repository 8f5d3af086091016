//! Edit-time validation policy
//!
//! Every text field goes through the same routine. Which checks run depends
//! on how the new input's length compares to the previous value:
//!
//! - shrinking: accepted as typed, error cleared
//! - growing by one character: character filter only
//! - anything else (paste, replace): normalized, then the full predicate

/// Character filter applied to single-character growth.
///
/// Returns the cleaned text, or `None` to reject the keystroke.
pub type CharacterFilter = fn(&str) -> Option<String>;

/// Normalization applied to bulk input before the predicate runs
pub type Normalizer = fn(&str) -> String;

/// Semantic predicate for a complete value
pub type Predicate = fn(&str) -> bool;

/// Which policy an edit falls under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPolicy {
    Shrink,
    SingleCharacter,
    Bulk,
}

impl EditPolicy {
    /// Select the policy by comparing character counts
    pub fn select(previous: &str, input: &str) -> Self {
        let old_len = previous.chars().count();
        let new_len = input.chars().count();

        if new_len < old_len {
            EditPolicy::Shrink
        } else if new_len == old_len + 1 {
            EditPolicy::SingleCharacter
        } else {
            EditPolicy::Bulk
        }
    }
}

/// Filter, normalizer and predicate for one field
#[derive(Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub filter: CharacterFilter,
    pub normalize: Normalizer,
    pub predicate: Predicate,
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule").field("name", &self.name).finish()
    }
}

/// Result of applying an edit to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// New field value
    pub value: String,

    /// New error flag
    pub error: bool,

    /// Policy that handled the edit
    pub policy: EditPolicy,

    /// False when the keystroke was rejected and the previous value kept
    pub accepted: bool,
}

impl FieldRule {
    /// Apply an edit to a field whose current value is `previous`
    pub fn apply(&self, previous: &str, input: &str) -> EditOutcome {
        let policy = EditPolicy::select(previous, input);

        match policy {
            EditPolicy::Shrink => EditOutcome {
                value: input.to_string(),
                error: false,
                policy,
                accepted: true,
            },
            EditPolicy::SingleCharacter => match (self.filter)(input) {
                Some(cleaned) => EditOutcome {
                    value: cleaned,
                    error: false,
                    policy,
                    accepted: true,
                },
                None => EditOutcome {
                    value: previous.to_string(),
                    error: false,
                    policy,
                    accepted: false,
                },
            },
            EditPolicy::Bulk => {
                let value = (self.normalize)(input);
                let error = !(self.predicate)(&value);
                EditOutcome {
                    value,
                    error,
                    policy,
                    accepted: true,
                }
            }
        }
    }

    /// Re-check a value on blur
    ///
    /// Empty values are not flagged; required-field checks handle those.
    pub fn check_on_blur(&self, value: &str) -> bool {
        !value.is_empty() && !(self.predicate)(value)
    }

    /// Full semantic check of a value
    pub fn is_valid(&self, value: &str) -> bool {
        (self.predicate)(value)
    }
}

/// Trim surrounding whitespace
pub fn trim(input: &str) -> String {
    input.trim().to_string()
}

/// Trim and collapse inner whitespace runs to a single space
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits_only(input: &str) -> Option<String> {
        Some(input.chars().filter(|c| c.is_ascii_digit()).collect())
    }

    fn reject_x(input: &str) -> Option<String> {
        if input.contains('x') {
            None
        } else {
            Some(input.to_string())
        }
    }

    fn non_empty(value: &str) -> bool {
        !value.is_empty() && value.len() < 4
    }

    const RULE: FieldRule = FieldRule {
        name: "test",
        filter: digits_only,
        normalize: trim,
        predicate: non_empty,
    };

    #[test]
    fn test_policy_selection() {
        assert_eq!(EditPolicy::select("abc", "ab"), EditPolicy::Shrink);
        assert_eq!(EditPolicy::select("abc", "abcd"), EditPolicy::SingleCharacter);
        assert_eq!(EditPolicy::select("abc", "abcdef"), EditPolicy::Bulk);
        assert_eq!(EditPolicy::select("abc", "xyz"), EditPolicy::Bulk);
        assert_eq!(EditPolicy::select("", "a"), EditPolicy::SingleCharacter);
    }

    #[test]
    fn test_policy_counts_characters_not_bytes() {
        assert_eq!(EditPolicy::select("é", "éa"), EditPolicy::SingleCharacter);
    }

    #[test]
    fn test_shrink_accepts_anything() {
        let out = RULE.apply("12345", "1a3");
        assert_eq!(out.value, "1a3");
        assert!(!out.error);
        assert_eq!(out.policy, EditPolicy::Shrink);
    }

    #[test]
    fn test_single_character_filters_without_validation() {
        let out = RULE.apply("1234", "1234a");
        assert_eq!(out.value, "1234");
        assert!(!out.error);
        assert!(out.accepted);
    }

    #[test]
    fn test_single_character_rejection_keeps_previous() {
        let rule = FieldRule {
            filter: reject_x,
            ..RULE
        };
        let out = rule.apply("ab", "abx");
        assert_eq!(out.value, "ab");
        assert!(!out.accepted);
    }

    #[test]
    fn test_bulk_trims_and_validates() {
        let out = RULE.apply("", "  12  ");
        assert_eq!(out.value, "12");
        assert!(!out.error);

        let out = RULE.apply("", "123456");
        assert!(out.error);
    }

    #[test]
    fn test_blur_ignores_empty() {
        assert!(!RULE.check_on_blur(""));
        assert!(RULE.check_on_blur("12345"));
        assert!(!RULE.check_on_blur("12"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a   b\tc \n"), "a b c");
    }
}
