//! Prompt construction per provider role. Every prompt requests the same
//! JSON envelope so one parser covers all reply shapes; role-specific
//! fields (channel, duration, thread_date) are asked for where they exist.

use clipnote_common::Content;

use crate::parse::ExpectedField;
use crate::route::ProviderRole;

/// Fields the parser should attempt to recover for a given role's reply.
pub fn expected_fields(role: ProviderRole) -> &'static [ExpectedField] {
    match role {
        ProviderRole::Thread => &[
            ExpectedField::Title,
            ExpectedField::Synopsis,
            ExpectedField::KeyPoints,
            ExpectedField::SecondaryIdentity,
        ],
        ProviderRole::Video => &[
            ExpectedField::Title,
            ExpectedField::Synopsis,
            ExpectedField::KeyPoints,
            ExpectedField::SecondaryIdentity,
            ExpectedField::Duration,
        ],
        ProviderRole::Article => &[
            ExpectedField::Title,
            ExpectedField::Synopsis,
            ExpectedField::KeyPoints,
            ExpectedField::SecondaryIdentity,
        ],
        ProviderRole::Topic => &[
            ExpectedField::Title,
            ExpectedField::Synopsis,
            ExpectedField::KeyPoints,
        ],
    }
}

pub fn thread_prompt(url: &str, body: Option<&str>) -> String {
    let mut prompt = format!(
        "Analyze the X (Twitter) post or thread at {url}. Read the full thread, \
         including replies by the author.\n\n"
    );
    if let Some(body) = body {
        prompt.push_str("Extracted thread text for reference:\n---\n");
        prompt.push_str(body);
        prompt.push_str("\n---\n\n");
    }
    prompt.push_str(
        "Respond with ONLY a JSON object, no other text:\n\
         {\n\
         \x20 \"title\": \"short descriptive title for the thread\",\n\
         \x20 \"author\": \"@handle of the author\",\n\
         \x20 \"thread_date\": \"date of the post if visible\",\n\
         \x20 \"summary\": \"2-3 sentence summary of the thread's argument\",\n\
         \x20 \"key_points\": [\"main point 1\", \"main point 2\", \"...\"]\n\
         }",
    );
    prompt
}

pub fn video_prompt(url: &str) -> String {
    format!(
        "Analyze the YouTube video at {url}. Use the transcript and description.\n\n\
         Respond with ONLY a JSON object, no other text:\n\
         {{\n\
         \x20 \"title\": \"the video's title\",\n\
         \x20 \"channel\": \"the channel name\",\n\
         \x20 \"duration\": \"video length as MM:SS or H:MM:SS\",\n\
         \x20 \"summary\": \"2-3 sentence summary of the video\",\n\
         \x20 \"key_points\": [\"notable moment with [MM:SS] timestamp\", \"...\"]\n\
         }}\n\n\
         Prefix each key point with its timestamp in [MM:SS] or [H:MM:SS] form."
    )
}

pub fn article_prompt(url: &str, content: &Content) -> String {
    let truncation_note = if content.truncated {
        "\n(The article text was truncated to fit; summarize what is present.)\n"
    } else {
        ""
    };
    format!(
        "Summarize the following article from {url}.\n\
         ---\n{body}\n---\n{truncation_note}\n\
         Respond with ONLY a JSON object, no other text:\n\
         {{\n\
         \x20 \"title\": \"the article's title\",\n\
         \x20 \"author\": \"the author's name if stated\",\n\
         \x20 \"publication\": \"the publication or site name\",\n\
         \x20 \"summary\": \"2-3 sentence summary of the article\",\n\
         \x20 \"key_points\": [\"main point 1\", \"main point 2\", \"...\"]\n\
         }}",
        body = content.text,
    )
}

pub fn topic_prompt(topic: &str) -> String {
    format!(
        "Research the following topic and produce a concise brief: {topic}\n\n\
         Respond with ONLY a JSON object, no other text:\n\
         {{\n\
         \x20 \"title\": \"a title for this brief\",\n\
         \x20 \"summary\": \"2-3 sentence overview of the topic\",\n\
         \x20 \"key_points\": [\"important fact or angle 1\", \"...\"],\n\
         \x20 \"suggestions\": [\"related thing worth reading or watching\", \"...\"]\n\
         }}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_prompt_embeds_body_when_present() {
        let with = thread_prompt("https://x.com/a/status/1", Some("thread text"));
        let without = thread_prompt("https://x.com/a/status/1", None);
        assert!(with.contains("thread text"));
        assert!(!without.contains("---"));
        assert!(with.contains("https://x.com/a/status/1"));
    }

    #[test]
    fn article_prompt_notes_truncation() {
        let content = Content {
            text: "body".to_string(),
            truncated: true,
        };
        let prompt = article_prompt("https://example.com/a", &content);
        assert!(prompt.contains("truncated"));
        assert!(prompt.contains("body"));
    }

    #[test]
    fn video_prompt_asks_for_timestamps() {
        let prompt = video_prompt("https://www.youtube.com/watch?v=abc123xyz");
        assert!(prompt.contains("[MM:SS]"));
        assert!(prompt.contains("channel"));
    }

    #[test]
    fn expected_fields_per_role() {
        assert!(expected_fields(ProviderRole::Video).contains(&ExpectedField::Duration));
        assert!(!expected_fields(ProviderRole::Topic).contains(&ExpectedField::SecondaryIdentity));
    }
}
