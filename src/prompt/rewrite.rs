use crate::message::Message;

/// Rules applied when the user supplies no instructions of their own.
const DEFAULT_RULES: [&str; 2] = ["Improved spelling and grammar", "Correct punctuation"];

/// A worked input/output pair demonstrating the expected rewrite format.
pub struct RewriteExample {
    pub input: &'static str,
    pub output: &'static str,
}

pub const REWRITE_EXAMPLES: &[RewriteExample] = &[
    RewriteExample {
        input: "i cant beleive its not more expensiver than the other one",
        output: "I can't believe it's not more expensive than the other one.",
    },
    RewriteExample {
        input: "Their going to announce the winner's tomorow at the Meeting",
        output: "They're going to announce the winners tomorrow at the meeting.",
    },
    RewriteExample {
        input: "The report, which was late needs reviewed by friday",
        output: "The report, which was late, needs to be reviewed by Friday.",
    },
];

/// Builds the copy-editing transcript: system instruction (with the user's
/// rules as bullets, or the defaults), the worked examples as user/assistant
/// pairs, then the real text. Pure; empty input still yields a well-formed
/// transcript.
pub fn rewrite_transcript(text: &str, instructions: Option<&str>) -> Vec<Message> {
    let rules: Vec<&str> = instructions
        .map(|raw| {
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect()
        })
        .filter(|lines: &Vec<&str>| !lines.is_empty())
        .unwrap_or_else(|| DEFAULT_RULES.to_vec());

    let bullets = rules
        .iter()
        .map(|rule| format!("- {}", rule))
        .collect::<Vec<_>>()
        .join("\n");

    let system = format!(
        "You are an assistant helping to improve the user's writing.
Rewrite the text you are given with:
{}

Reply with the rewritten text only, without quotes or commentary.",
        bullets
    );

    let mut transcript = Vec::with_capacity(2 + REWRITE_EXAMPLES.len() * 2);
    transcript.push(Message::system(system));
    for example in REWRITE_EXAMPLES {
        transcript.push(Message::user(format!("Text: {}", example.input)));
        transcript.push(Message::assistant(example.output));
    }
    transcript.push(Message::user(format!("Text: {}", text)));
    transcript
}
