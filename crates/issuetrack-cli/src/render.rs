//! Plain-text rendering of issues for the terminal.

use issuetrack_core::utils::truncate_string;
use issuetrack_core::Issue;

/// Longest title shown before truncation
const MAX_TITLE_WIDTH: usize = 60;

/// Render one issue as a block of text: title, location, description.
pub fn render_issue(issue: &Issue) -> String {
    let mut out = String::new();
    out.push_str(&truncate_string(&issue.title, MAX_TITLE_WIDTH));
    out.push('\n');
    out.push_str(&format!("  Location: {}\n", issue.location));
    for line in issue.description.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_issue() {
        let issue = Issue {
            title: "Pothole".to_string(),
            location: "Main St".to_string(),
            description: "Deep\nNear the bakery".to_string(),
        };
        assert_eq!(
            render_issue(&issue),
            "Pothole\n  Location: Main St\n  Deep\n  Near the bakery\n"
        );
    }

    #[test]
    fn test_render_truncates_long_title() {
        let issue = Issue {
            title: "x".repeat(100),
            location: "Main St".to_string(),
            description: "Deep".to_string(),
        };
        let first_line = render_issue(&issue).lines().next().unwrap().to_string();
        assert_eq!(first_line.len(), MAX_TITLE_WIDTH);
        assert!(first_line.ends_with("..."));
    }
}
