//! User-facing notices. All text is Telegram HTML.

pub const WELCOME: &str = "Hi! I generate sound effects with AI.\n\n\
Send /generate with a description to turn it into audio. For example: <code>/generate kick</code>\n\n\
The bot relies on the third-party ElevenLabs service, so please follow its rules \
and don't abuse it.";

pub const GENERATE_USAGE: &str =
    "🤔 Tell me what to generate. For example: <code>/generate kick</code>";

pub const GENERATION_STARTED: &str = "🎵 Generating audio...";

pub const EMPTY_RESULT: &str =
    "😔 The service returned an empty result, it happens sometimes. Please try again.";

pub const MULTIPLE_FILES: &str =
    "🥁 The service generated several audio files, sending them one by one...";

pub const UNKNOWN_COMMAND: &str = "I don't know that command";

/// Completion notice echoing the command so it can be copied and re-sent.
#[must_use]
pub fn generation_finished(invocation: &str) -> String {
    format!(
        "🎵 Audio generation finished! To generate more, send <code>{}</code>",
        escape_html(invocation)
    )
}

#[must_use]
pub fn failure(code: &str, message: &str) -> String {
    format!(
        "⚠️ Something went wrong [<code>{code}</code>]: <code>{}</code>",
        escape_html(message)
    )
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
