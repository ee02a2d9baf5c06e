//! Prompt construction for classification and reorg calls.

use std::fmt::Write as _;

use curio_core::usage::CategoryUsage;
use curio_core::{ContentRecord, ReorgRequest};

/// System message for classification calls.
pub const CLASSIFICATION_SYSTEM_PROMPT: &str = "You are a content categorization assistant. \
     Always respond with valid JSON arrays only. Be concise and accurate.";

/// System message for reorg suggestion calls.
pub const REORG_SYSTEM_PROMPT: &str = "You are a taxonomy curation assistant. \
     Always respond with valid JSON objects only. Be concise and accurate.";

/// Fixed catalogue of well-known categories offered to the model.
/// Provider-invented names are still permitted when none of these fit.
pub const CATEGORY_CATALOGUE: &[&str] = &[
    "Technology",
    "Business",
    "Health",
    "Entertainment",
    "Sports",
    "Politics",
    "Science",
    "Education",
    "Travel",
    "Food",
    "Fashion",
    "Art",
    "Music",
    "Gaming",
    "Finance",
    "Marketing",
    "Design",
    "Photography",
    "Fitness",
    "News",
    "Lifestyle",
    "DIY",
    "Environment",
    "Books",
    "Movies",
    "TV Shows",
    "Humor",
    "Motivation",
    "Career",
    "Productivity",
    "Relationships",
    "Parenting",
    "Pets",
    "Real Estate",
    "Cryptocurrency",
    "AI",
    "Programming",
    "Data Science",
    "Startups",
    "Social Media",
    "Writing",
    "History",
    "Philosophy",
    "Psychology",
    "Self Improvement",
];

/// Build the classification prompt for one record.
///
/// Embeds the platform, author, post text, the fixed catalogue, and —
/// when present — the user's existing categories with usage counts so
/// the model leans toward names already in the taxonomy.
pub fn classification_prompt(record: &ContentRecord, existing: &[CategoryUsage]) -> String {
    let author = record.author.as_deref().unwrap_or("Unknown");

    let mut prompt = format!(
        "Analyze the following social media post and categorize it into 1-3 relevant topics.\n\n\
         Platform: {}\n\
         Author: {}\n\
         Content: {}\n\n\
         Available categories: {}\n",
        record.platform,
        author,
        record.text,
        CATEGORY_CATALOGUE.join(", "),
    );

    if !existing.is_empty() {
        prompt.push_str("\nThe user already organizes content with these categories (usage count in parentheses); prefer reusing them when they fit:\n");
        for usage in existing {
            let _ = writeln!(prompt, "- {} ({})", usage.name, usage.usage_count);
        }
    }

    prompt.push_str(
        "\nInstructions:\n\
         1. Select 1-3 most relevant categories from the lists above\n\
         2. If none fit well, you may suggest new appropriate categories\n\
         3. Be concise and accurate\n\
         4. Respond with ONLY a JSON array of category strings\n\n\
         Example response format: [\"Technology\", \"AI\", \"Programming\"]",
    );

    prompt
}

/// Build the reorg suggestion prompt.
pub fn reorg_prompt(request: &ReorgRequest) -> String {
    let mut prompt = format!(
        "You are helping reorganize a user's content category taxonomy.\n\n\
         Requested action: {}\n\
         Selected categories: {}\n",
        request.action,
        request.categories.join(", "),
    );

    if !request.usage.is_empty() {
        prompt.push_str("\nCurrent usage across all categories:\n");
        for usage in &request.usage {
            let _ = writeln!(prompt, "- {}: {} items", usage.name, usage.usage_count);
        }
    }

    if let Some(goal) = request.goal.as_deref().filter(|g| !g.trim().is_empty()) {
        let _ = writeln!(prompt, "\nUser goal: {}", goal.trim());
    }

    let _ = write!(
        prompt,
        "\nPropose category {} mappings for the selected categories.\n\
         Respond with ONLY a JSON object of this exact form:\n\
         {{\"suggestions\": [{{\"from\": \"Old Name\", \"to\": \"New Name\", \"reason\": \"short rationale\"}}], \"notes\": \"optional summary\"}}\n\
         Only include mappings where \"from\" differs from \"to\".",
        request.action,
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use curio_core::{InteractionType, Platform, ReorgAction};

    fn record() -> ContentRecord {
        ContentRecord::new(
            "x1",
            Platform::Twitter,
            InteractionType::Like,
            "new GPU architecture announced",
        )
        .with_author("chipwatcher")
    }

    #[test]
    fn test_catalogue_has_no_duplicates() {
        let mut names: Vec<&str> = CATEGORY_CATALOGUE.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CATEGORY_CATALOGUE.len());
    }

    #[test]
    fn test_classification_prompt_embeds_fields() {
        let prompt = classification_prompt(&record(), &[]);
        assert!(prompt.contains("Platform: twitter"));
        assert!(prompt.contains("Author: chipwatcher"));
        assert!(prompt.contains("new GPU architecture announced"));
        assert!(prompt.contains("Available categories: Technology,"));
        assert!(prompt.contains("ONLY a JSON array"));
    }

    #[test]
    fn test_classification_prompt_unknown_author() {
        let mut r = record();
        r.author = None;
        let prompt = classification_prompt(&r, &[]);
        assert!(prompt.contains("Author: Unknown"));
    }

    #[test]
    fn test_classification_prompt_existing_categories() {
        let existing = vec![CategoryUsage {
            name: "Tech/AI".to_string(),
            usage_count: 7,
        }];
        let prompt = classification_prompt(&record(), &existing);
        assert!(prompt.contains("- Tech/AI (7)"));

        let bare = classification_prompt(&record(), &[]);
        assert!(!bare.contains("already organizes"));
    }

    #[test]
    fn test_reorg_prompt_shape() {
        let request = ReorgRequest {
            action: ReorgAction::Merge,
            categories: vec!["Tech".to_string(), "Technology".to_string()],
            usage: vec![CategoryUsage {
                name: "Tech".to_string(),
                usage_count: 3,
            }],
            goal: Some("fewer near-duplicates".to_string()),
        };
        let prompt = reorg_prompt(&request);
        assert!(prompt.contains("Requested action: merge"));
        assert!(prompt.contains("Selected categories: Tech, Technology"));
        assert!(prompt.contains("- Tech: 3 items"));
        assert!(prompt.contains("User goal: fewer near-duplicates"));
        assert!(prompt.contains("\"suggestions\""));
    }

    #[test]
    fn test_reorg_prompt_blank_goal_omitted() {
        let request = ReorgRequest {
            action: ReorgAction::Rename,
            categories: vec!["Tech".to_string()],
            usage: vec![],
            goal: Some("   ".to_string()),
        };
        assert!(!reorg_prompt(&request).contains("User goal"));
    }
}
