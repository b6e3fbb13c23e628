//! Prompt construction and response parsing for meeting summaries.

/// System prompt for the meeting analyst.
pub const SYSTEM_PROMPT: &str = "\
You are an expert meeting transcription analyst specializing in extracting key information from conversations.
Your task is to analyze the provided meeting transcript and create a well-structured summary.

This transcript primarily contains speech from participants other than the user who initiated the recording.
Focus on what OTHERS said in the meeting, not the recording user's own contributions.

Produce a response with these sections:
1. MEETING SUMMARY: A concise 4-6 sentence overview of what the other participants discussed
2. KEY POINTS: A bulleted list of the 5-7 most important points mentioned by other participants
3. ACTION ITEMS: A bulleted list of all tasks, assignments, or follow-ups that others mentioned or that were assigned to others
4. DECISIONS MADE: A bulleted list of any decisions or conclusions reached by other participants

Format these sections clearly with headings. Focus on substance over style.
Do not include technical formatting symbols. Use plain text only.";

/// Build the user prompt around a transcript.
pub fn build_user_prompt(transcript: &str) -> String {
    format!(
        "Meeting Transcript:\n{transcript}\n\n\
         Please analyze this meeting transcript and provide a structured summary \
         focusing on the most important information.\n\
         Include only what was actually discussed in the meeting - do not invent \
         or assume additional content."
    )
}

/// Extract the bulleted items of the KEY POINTS section from the model's
/// free-text response. Returns an empty list if the section is absent.
pub fn parse_key_points(summary_text: &str) -> Vec<String> {
    let Some(after) = summary_text.split("KEY POINTS:").nth(1) else {
        return Vec::new();
    };
    let section = after.split("ACTION ITEMS:").next().unwrap_or(after);

    section
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(['•', '-', '*']))
        .map(|line| line.trim_start_matches(['•', '-', '*', ' ']).to_string())
        .filter(|point| !point.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bulleted_key_points() {
        let text = "MEETING SUMMARY: A discussion.\n\
                    KEY POINTS:\n\
                    - First point\n\
                    • Second point\n\
                    * Third point\n\
                    ACTION ITEMS:\n\
                    - Do something\n";
        assert_eq!(
            parse_key_points(text),
            vec!["First point", "Second point", "Third point"]
        );
    }

    #[test]
    fn missing_section_yields_empty() {
        assert!(parse_key_points("MEETING SUMMARY: nothing else").is_empty());
    }

    #[test]
    fn key_points_at_end_of_text() {
        let text = "KEY POINTS:\n- Only point";
        assert_eq!(parse_key_points(text), vec!["Only point"]);
    }

    #[test]
    fn ignores_non_bullet_lines() {
        let text = "KEY POINTS:\nThese are the highlights:\n- Real point\n\nACTION ITEMS:";
        assert_eq!(parse_key_points(text), vec!["Real point"]);
    }

    #[test]
    fn user_prompt_embeds_transcript() {
        let prompt = build_user_prompt("hello world");
        assert!(prompt.contains("hello world"));
        assert!(prompt.starts_with("Meeting Transcript:"));
    }
}
