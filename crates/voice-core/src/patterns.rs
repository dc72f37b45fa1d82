//! Ready-made call programs for the common speak-then-listen flows

use crate::ncco::{Ncco, NccoBuilder};

/// Seconds to wait for the caller to start speaking
pub const LISTEN_START_TIMEOUT_SECS: u32 = 5;
/// Upper bound on one recognized utterance
pub const LISTEN_MAX_DURATION_SECS: u32 = 30;
/// Silence that ends a Japanese utterance
pub const JAPANESE_END_ON_SILENCE_SECS: f64 = 1.5;

/// Speak `text`, then listen for speech and post the result to `input_event_url`
pub fn talk_and_input(
    text: &str,
    language: &str,
    voice_name: &str,
    input_event_url: &str,
    end_on_silence: f64,
) -> Ncco {
    listen(
        NccoBuilder::new()
            .talk(text)
            .voice_name(voice_name)
            .language(language)
            .done(),
        input_event_url,
        end_on_silence,
    )
}

pub fn talk_japanese(text: &str) -> Ncco {
    NccoBuilder::new().talk(text).japanese().done().build()
}

pub fn talk_and_input_japanese(text: &str, input_event_url: &str) -> Ncco {
    listen(
        NccoBuilder::new().talk(text).japanese().done(),
        input_event_url,
        JAPANESE_END_ON_SILENCE_SECS,
    )
}

/// Play `audio_url`, then listen for speech
pub fn stream_and_input(audio_url: &str, input_event_url: &str, end_on_silence: f64) -> Ncco {
    listen(
        NccoBuilder::new().stream([audio_url]).done(),
        input_event_url,
        end_on_silence,
    )
}

fn listen(program: NccoBuilder, input_event_url: &str, end_on_silence: f64) -> Ncco {
    program
        .input()
        .speech()
        .event_url(input_event_url)
        .end_on_silence(end_on_silence)
        .start_timeout(LISTEN_START_TIMEOUT_SECS)
        .max_duration(LISTEN_MAX_DURATION_SECS)
        .done()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ncco::Action;
    use serde_json::json;

    #[test]
    fn test_talk_and_input_japanese() {
        let ncco = talk_and_input_japanese("こんにちは", "https://example.com/asr");
        assert_eq!(
            ncco.to_value().unwrap(),
            json!([
                {"action": "talk", "text": "こんにちは", "voiceName": "Mizuki", "language": "ja-JP"},
                {
                    "action": "input",
                    "type": ["speech"],
                    "eventUrl": ["https://example.com/asr"],
                    "eventMethod": "POST",
                    "speech": {"endOnSilence": 1.5, "startTimeout": 5, "maxDuration": 30}
                }
            ])
        );
    }

    #[test]
    fn test_talk_and_input_uses_given_voice() {
        let ncco = talk_and_input("hello", "en-US", "Joanna", "https://example.com/asr", 2.0);
        match &ncco.actions()[0] {
            Action::Talk(talk) => {
                assert_eq!(talk.voice_name.as_deref(), Some("Joanna"));
                assert_eq!(talk.language.as_deref(), Some("en-US"));
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert_eq!(ncco.to_value().unwrap()[1]["speech"]["endOnSilence"], 2.0);
    }

    #[test]
    fn test_stream_and_input() {
        let ncco = stream_and_input("https://example.com/hello.mp3", "https://example.com/asr", 1.0);
        let names: Vec<_> = ncco.iter().map(Action::name).collect();
        assert_eq!(names, ["stream", "input"]);
    }

    #[test]
    fn test_talk_japanese_is_single_action() {
        let ncco = talk_japanese("はい");
        assert_eq!(ncco.len(), 1);
        assert_eq!(ncco.to_value().unwrap()[0]["voiceName"], "Mizuki");
    }
}
