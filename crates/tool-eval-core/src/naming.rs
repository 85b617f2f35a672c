//! Tool name normalization across separator conventions
//!
//! Providers disagree on which characters a tool name may contain: catalog
//! names use `Toolkit.Tool`, OpenAI rejects dots and gets `Toolkit_Tool`,
//! some servers use kebab-case. Comparisons go through [`normalize_name`].

/// Canonical separator between a toolkit and a tool name
pub const TOOL_NAME_SEPARATOR: char = '.';

/// Separators treated as equivalent when comparing tool names
pub const NAME_SEPARATORS: &[char] = &['-', '_', '.'];

/// Replace every recognized separator with [`TOOL_NAME_SEPARATOR`]
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if NAME_SEPARATORS.contains(&c) {
                TOOL_NAME_SEPARATOR
            } else {
                c
            }
        })
        .collect()
}

/// Compare two tool names ignoring separator style and case.
///
/// `compare_tool_name("Google_ListEmails", "Google.ListEmails")` is true.
pub fn compare_tool_name(expected: &str, actual: &str) -> bool {
    normalize_name(expected).to_lowercase() == normalize_name(actual).to_lowercase()
}

/// Key used for order-insensitive multiset comparisons of tool names
pub fn comparison_key(name: &str) -> String {
    normalize_name(name).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_replaces_all_separators() {
        assert_eq!(normalize_name("Google_List-Emails"), "Google.List.Emails");
        assert_eq!(normalize_name("Google.ListEmails"), "Google.ListEmails");
    }

    #[test]
    fn test_compare_across_separators() {
        assert!(compare_tool_name("Google_ListEmails", "Google.ListEmails"));
        assert!(!compare_tool_name("jira-create-issue", "Jira_CreateIssue"));
        assert!(compare_tool_name("jira-create-issue", "Jira_Create_Issue"));
    }

    #[test]
    fn test_compare_is_case_insensitive() {
        assert!(compare_tool_name("linear.get_issue", "Linear_Get_Issue"));
    }

    #[test]
    fn test_different_names_do_not_match() {
        assert!(!compare_tool_name("Slack.SendMessage", "Slack.SendDm"));
    }
}
