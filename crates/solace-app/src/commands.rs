//! Terminal commands: classify, chat, and taxonomy.

use std::io::{BufRead, Write};

use solace_core::{ChatError, ChatSession, Detection, EmergencyClassifier};

/// Process exit status of `classify` when the text is flagged.
///
/// Errors exit with 1, so a flagged result is kept distinct from a failure.
pub const FLAGGED_EXIT_CODE: u8 = 2;

/// Exit status for a classification result: 0 when clear.
pub fn classify_exit_code(flagged: bool) -> u8 {
    if flagged {
        FLAGGED_EXIT_CODE
    } else {
        0
    }
}

/// Writes the classification of `text` and returns whether it is an emergency.
pub fn classify(
    classifier: &EmergencyClassifier,
    text: &str,
    all: bool,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let detection = if all {
        classifier.detect_all(text)
    } else {
        classifier.detect(text)
    };

    if json {
        serde_json::to_writer_pretty(&mut *out, &detection)?;
        writeln!(out)?;
    } else {
        write_detection(&detection, out)?;
    }

    Ok(detection.is_emergency)
}

fn write_detection(detection: &Detection, out: &mut impl Write) -> std::io::Result<()> {
    if !detection.is_emergency {
        return writeln!(out, "no emergency language found");
    }

    writeln!(out, "EMERGENCY")?;
    for m in &detection.matches {
        writeln!(out, "  {}: \"{}\"", m.category.label(), m.phrase)?;
    }
    Ok(())
}

/// Runs an interactive chat until end of input or `/quit`.
pub fn chat(
    mut session: ChatSession,
    input: impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<ChatSession> {
    for message in session.chat().messages() {
        writeln!(out, "assistant> {}", message.content())?;
    }

    let mut lines = input.lines();
    loop {
        write!(out, "you> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        if line.trim() == "/quit" {
            break;
        }

        match session.submit(&line) {
            Ok(exchange) => {
                if let Some(m) = exchange.detection.primary() {
                    writeln!(out, "[flagged: {} \"{}\"]", m.category.label(), m.phrase)?;
                }
                writeln!(out, "assistant> {}", exchange.reply.content())?;
            }
            Err(ChatError::EmptyMessage) => continue,
        }
    }

    let chat = session.chat();
    writeln!(
        out,
        "Chat ended: {} messages, emergency: {}",
        chat.messages().len(),
        if chat.is_emergency() { "yes" } else { "no" }
    )?;
    tracing::info!(
        chat_id = %chat.id,
        messages = chat.messages().len(),
        is_emergency = chat.is_emergency(),
        "Terminal chat ended"
    );

    Ok(session)
}

/// Writes the classifier's taxonomy as pretty JSON.
pub fn taxonomy(classifier: &EmergencyClassifier, out: &mut impl Write) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, classifier.taxonomy())?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use solace_core::chat::{FixedPicker, CRISIS_REPLY, SUPPORTIVE_REPLIES, WELCOME_MESSAGE};

    use super::*;

    fn run_classify(text: &str, all: bool, json: bool) -> (bool, String) {
        let classifier = EmergencyClassifier::new();
        let mut out = Vec::new();
        let flagged = classify(&classifier, text, all, json, &mut out).unwrap();
        (flagged, String::from_utf8(out).unwrap())
    }

    #[test]
    fn classify_reports_clear_text() {
        let (flagged, out) = run_classify("I've been feeling really anxious lately.", false, false);
        assert!(!flagged);
        assert_eq!(out, "no emergency language found\n");
    }

    #[test]
    fn classify_reports_first_match() {
        let (flagged, out) = run_classify("I don't want to live anymore.", false, false);
        assert!(flagged);
        assert_eq!(out, "EMERGENCY\n  Suicide: \"don't want to live\"\n");
    }

    #[test]
    fn classify_exit_codes() {
        let (flagged, _) = run_classify("I want to end my life", false, false);
        assert_eq!(classify_exit_code(flagged), FLAGGED_EXIT_CODE);

        let (flagged, _) = run_classify("I feel fine today", false, false);
        assert_eq!(classify_exit_code(flagged), 0);
    }

    #[test]
    fn classify_all_reports_every_match() {
        let (_, out) = run_classify("kill myself, cut myself", true, false);
        assert!(out.contains("Suicide: \"kill myself\""));
        assert!(out.contains("Self-Harm: \"cut myself\""));
    }

    #[test]
    fn classify_json_output() {
        let (_, out) = run_classify("someone keeps hitting me", false, true);
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["is_emergency"], false);
    }

    #[test]
    fn chat_runs_until_end_of_input() {
        let session = ChatSession::new("cli-test", "cli", Arc::new(EmergencyClassifier::new()))
            .with_picker(FixedPicker(0));
        let input = Cursor::new("hello\n\nI want to end my life\n");
        let mut out = Vec::new();

        let session = chat(session, input, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with(&format!("assistant> {}", WELCOME_MESSAGE)));
        assert!(out.contains(SUPPORTIVE_REPLIES[0]));
        assert!(out.contains("[flagged: Suicide \"end my life\"]"));
        assert!(out.contains(CRISIS_REPLY));
        assert!(out.contains("Chat ended: 5 messages, emergency: yes"));
        assert!(session.chat().is_emergency());
    }

    #[test]
    fn chat_stops_on_quit() {
        let session = ChatSession::new("cli-test", "cli", Arc::new(EmergencyClassifier::new()));
        let input = Cursor::new("/quit\nI want to end my life\n");
        let mut out = Vec::new();

        let session = chat(session, input, &mut out).unwrap();
        assert_eq!(session.chat().messages().len(), 1);
        assert!(!session.chat().is_emergency());
    }

    #[test]
    fn taxonomy_prints_json() {
        let mut out = Vec::new();
        taxonomy(&EmergencyClassifier::new(), &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["abuse"][2], "hit me");
    }
}
