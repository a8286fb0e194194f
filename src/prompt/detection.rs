use crate::message::Message;
use crate::prompt::common::current_date;

/// A worked example for date detection: a reference date giving the model
/// a "today", an input text, and the exact JSON it should produce.
pub struct DateExample {
    pub reference_date: &'static str,
    pub input: &'static str,
    pub output: &'static str,
}

pub const DATE_EXAMPLES: &[DateExample] = &[
    DateExample {
        reference_date: "Saturday, May 6, 2023",
        input: "Remind me to take out the trash on Tuesday.",
        output: r#"{"annotated": "Remind me to take out the trash on **Tuesday**.", "date": "2023-05-09"}"#,
    },
    DateExample {
        reference_date: "Monday, January 2, 2023",
        input: "stop by the post office wednesday",
        output: r#"{"annotated": "stop by the post office **wednesday**", "date": "2023-01-04"}"#,
    },
    DateExample {
        reference_date: "Friday, March 15, 2024",
        input: "The invoice is due April 3, 2024 at noon.",
        output: r#"{"annotated": "The invoice is due **April 3, 2024** at noon.", "date": "2024-04-03"}"#,
    },
];

const DETECTION_INSTRUCTIONS: &str = r#"You are an assistant that detects date expressions in text.

Find the single date expression in the user's text and answer with a JSON object containing exactly two fields:
- "annotated": the user's text reproduced byte-for-byte, with the date expression wrapped in ** markers. The markers must appear exactly twice and removing them must restore the text unchanged.
- "date": the calendar date the expression resolves to, relative to the current date given with the text, in YYYY-MM-DD format.

Answer with the JSON object only. If the text contains no date expression, answer with the single word null."#;

/// Builds the date-detection transcript: instruction, worked examples as
/// user/assistant pairs, then the real text together with the current
/// calendar date so relative expressions can be resolved.
pub fn detection_transcript(text: &str) -> Vec<Message> {
    let mut transcript = Vec::with_capacity(2 + DATE_EXAMPLES.len() * 2);
    transcript.push(Message::system(DETECTION_INSTRUCTIONS));
    for example in DATE_EXAMPLES {
        transcript.push(Message::user(format!(
            "Current date: {}\nText: {}",
            example.reference_date, example.input
        )));
        transcript.push(Message::assistant(example.output));
    }
    transcript.push(Message::user(format!(
        "Current date: {}\nText: {}",
        current_date(),
        text
    )));
    transcript
}
