//! Call control objects (NCCO)
//!
//! A call program is an ordered list of actions executed in sequence by the
//! Voice API. [`NccoBuilder`] assembles one fluently: each action method
//! hands out a sub-builder that owns the program, and `done()` appends the
//! finished action and hands the program back.
//!
//! ```
//! use vonage_voice_core::ncco::NccoBuilder;
//!
//! let ncco = NccoBuilder::new()
//!     .talk("hi").language("ja-JP").done()
//!     .input().speech().done()
//!     .build();
//!
//! assert_eq!(ncco.len(), 2);
//! ```
//!
//! Optional fields are left off the wire entirely. Numeric values such as
//! `level` are passed through without range checks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP method used for action callbacks when none is set
pub const DEFAULT_EVENT_METHOD: &str = "POST";

/// Voice used by [`TalkBuilder::japanese`]
pub const JAPANESE_VOICE_NAME: &str = "Mizuki";
/// Language used by [`TalkBuilder::japanese`]
pub const JAPANESE_LANGUAGE: &str = "ja-JP";

/// One step of a call program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Talk(Talk),
    Stream(Stream),
    Input(Input),
    Record(Record),
    Notify(Notify),
}

impl Action {
    /// Wire name of the action
    pub fn name(&self) -> &'static str {
        match self {
            Action::Talk(_) => "talk",
            Action::Stream(_) => "stream",
            Action::Input(_) => "input",
            Action::Record(_) => "record",
            Action::Notify(_) => "notify",
        }
    }
}

/// Text-to-speech
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Talk {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barge_in: Option<bool>,
    /// Repetitions, 0 loops forever
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_count: Option<u32>,
}

/// Audio file playback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub stream_url: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barge_in: Option<bool>,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_count: Option<u32>,
}

/// Input modality collected by an [`Input`] action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Speech,
    Dtmf,
}

/// Caller input collection (speech recognition and/or keypad)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub kind: Vec<InputType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_url: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<SpeechSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtmf: Option<DtmfSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechSettings {
    /// Seconds of silence that end recognition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_on_silence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Hints for the recognizer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DtmfSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_digits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_on_hash: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_out: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    Mp3,
    Wav,
    Ogg,
}

/// Call recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<RecordFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_on_silence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_on_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beep_start: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_url: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_method: Option<String>,
    /// `"conversation"` records each leg separately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
}

/// Callback to the application with a custom payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notify {
    pub payload: Map<String, Value>,
    pub event_url: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_method: Option<String>,
}

/// An ordered call program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ncco(Vec<Action>);

impl Ncco {
    pub fn new(actions: Vec<Action>) -> Self {
        Self(actions)
    }

    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.0.iter()
    }

    /// Wire form: a JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl From<Vec<Action>> for Ncco {
    fn from(actions: Vec<Action>) -> Self {
        Self(actions)
    }
}

impl IntoIterator for Ncco {
    type Item = Action;
    type IntoIter = std::vec::IntoIter<Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Ncco {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Fluent builder for an [`Ncco`]
#[derive(Debug, Clone, Default)]
pub struct NccoBuilder {
    actions: Vec<Action>,
}

impl NccoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn talk(self, text: impl Into<String>) -> TalkBuilder {
        TalkBuilder {
            parent: self,
            action: Talk {
                text: text.into(),
                ..Default::default()
            },
        }
    }

    pub fn stream<I, S>(self, urls: I) -> StreamBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StreamBuilder {
            parent: self,
            action: Stream {
                stream_url: urls.into_iter().map(Into::into).collect(),
                ..Default::default()
            },
        }
    }

    pub fn input(self) -> InputBuilder {
        InputBuilder {
            parent: self,
            action: Input::default(),
        }
    }

    pub fn record(self) -> RecordBuilder {
        RecordBuilder {
            parent: self,
            action: Record::default(),
        }
    }

    /// Append a notify action; it has no optional fields so no sub-builder
    pub fn notify(mut self, event_url: impl Into<String>, payload: Map<String, Value>) -> Self {
        self.actions.push(Action::Notify(Notify {
            payload,
            event_url: vec![event_url.into()],
            event_method: Some(DEFAULT_EVENT_METHOD.to_string()),
        }));
        self
    }

    /// Append an action built elsewhere
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn build(self) -> Ncco {
        Ncco(self.actions)
    }

    fn push(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

pub struct TalkBuilder {
    parent: NccoBuilder,
    action: Talk,
}

impl TalkBuilder {
    pub fn voice_name(mut self, name: impl Into<String>) -> Self {
        self.action.voice_name = Some(name.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.action.language = Some(language.into());
        self
    }

    pub fn style(mut self, style: u32) -> Self {
        self.action.style = Some(style);
        self
    }

    pub fn premium(mut self) -> Self {
        self.action.premium = Some(true);
        self
    }

    /// Volume, nominally -1 to 1
    pub fn level(mut self, level: f64) -> Self {
        self.action.level = Some(level);
        self
    }

    /// Let the caller interrupt playback
    pub fn barge_in(mut self) -> Self {
        self.action.barge_in = Some(true);
        self
    }

    pub fn loop_count(mut self, count: u32) -> Self {
        self.action.loop_count = Some(count);
        self
    }

    /// Japanese speech with the Mizuki voice
    pub fn japanese(self) -> Self {
        self.voice_name(JAPANESE_VOICE_NAME).language(JAPANESE_LANGUAGE)
    }

    pub fn done(self) -> NccoBuilder {
        self.parent.push(Action::Talk(self.action))
    }
}

pub struct StreamBuilder {
    parent: NccoBuilder,
    action: Stream,
}

impl StreamBuilder {
    pub fn level(mut self, level: f64) -> Self {
        self.action.level = Some(level);
        self
    }

    pub fn barge_in(mut self) -> Self {
        self.action.barge_in = Some(true);
        self
    }

    pub fn loop_count(mut self, count: u32) -> Self {
        self.action.loop_count = Some(count);
        self
    }

    pub fn done(self) -> NccoBuilder {
        self.parent.push(Action::Stream(self.action))
    }
}

pub struct InputBuilder {
    parent: NccoBuilder,
    action: Input,
}

impl InputBuilder {
    pub fn speech(mut self) -> Self {
        self.add_type(InputType::Speech);
        self
    }

    pub fn dtmf(mut self) -> Self {
        self.add_type(InputType::Dtmf);
        self
    }

    pub fn speech_and_dtmf(mut self) -> Self {
        self.action.kind = vec![InputType::Speech, InputType::Dtmf];
        self
    }

    pub fn event_url(mut self, url: impl Into<String>) -> Self {
        self.action.event_url = Some(vec![url.into()]);
        self
    }

    pub fn event_method(mut self, method: impl Into<String>) -> Self {
        self.action.event_method = Some(method.into());
        self
    }

    pub fn end_on_silence(mut self, seconds: f64) -> Self {
        self.speech_settings().end_on_silence = Some(seconds);
        self
    }

    pub fn start_timeout(mut self, seconds: u32) -> Self {
        self.speech_settings().start_timeout = Some(seconds);
        self
    }

    pub fn max_duration(mut self, seconds: u32) -> Self {
        self.speech_settings().max_duration = Some(seconds);
        self
    }

    /// Recognition language, e.g. `ja-JP`
    pub fn speech_language(mut self, language: impl Into<String>) -> Self {
        self.speech_settings().language = Some(language.into());
        self
    }

    pub fn speech_context<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.speech_settings().context = hints.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_digits(mut self, digits: u32) -> Self {
        self.dtmf_settings().max_digits = Some(digits);
        self
    }

    /// End keypad input on `#`
    pub fn submit_on_hash(mut self) -> Self {
        self.dtmf_settings().submit_on_hash = Some(true);
        self
    }

    pub fn time_out(mut self, seconds: u32) -> Self {
        self.dtmf_settings().time_out = Some(seconds);
        self
    }

    /// Finish the action; `eventMethod` becomes POST unless set
    pub fn done(mut self) -> NccoBuilder {
        if self.action.event_method.is_none() {
            self.action.event_method = Some(DEFAULT_EVENT_METHOD.to_string());
        }
        self.parent.push(Action::Input(self.action))
    }

    fn add_type(&mut self, kind: InputType) {
        if !self.action.kind.contains(&kind) {
            self.action.kind.push(kind);
        }
    }

    fn speech_settings(&mut self) -> &mut SpeechSettings {
        self.action.speech.get_or_insert_with(SpeechSettings::default)
    }

    fn dtmf_settings(&mut self) -> &mut DtmfSettings {
        self.action.dtmf.get_or_insert_with(DtmfSettings::default)
    }
}

pub struct RecordBuilder {
    parent: NccoBuilder,
    action: Record,
}

impl RecordBuilder {
    pub fn format(mut self, format: RecordFormat) -> Self {
        self.action.format = Some(format);
        self
    }

    pub fn end_on_silence(mut self, seconds: f64) -> Self {
        self.action.end_on_silence = Some(seconds);
        self
    }

    pub fn end_on_key(mut self, key: impl Into<String>) -> Self {
        self.action.end_on_key = Some(key.into());
        self
    }

    pub fn beep_start(mut self) -> Self {
        self.action.beep_start = Some(true);
        self
    }

    pub fn event_url(mut self, url: impl Into<String>) -> Self {
        self.action.event_url = Some(vec![url.into()]);
        self
    }

    pub fn event_method(mut self, method: impl Into<String>) -> Self {
        self.action.event_method = Some(method.into());
        self
    }

    /// Record each call leg on its own channel
    pub fn split(mut self) -> Self {
        self.action.split = Some("conversation".to_string());
        self
    }

    pub fn channels(mut self, channels: u32) -> Self {
        self.action.channels = Some(channels);
        self
    }

    pub fn done(self) -> NccoBuilder {
        self.parent.push(Action::Record(self.action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_talk_then_input_serializes_in_order_with_default_method() {
        let ncco = NccoBuilder::new()
            .talk("hi")
            .language("ja-JP")
            .done()
            .input()
            .speech()
            .done()
            .build();

        assert_eq!(
            ncco.to_value().unwrap(),
            json!([
                {"action": "talk", "text": "hi", "language": "ja-JP"},
                {"action": "input", "type": ["speech"], "eventMethod": "POST"}
            ])
        );
    }

    #[test]
    fn test_explicit_event_method_is_kept() {
        let ncco = NccoBuilder::new()
            .input()
            .dtmf()
            .event_method("GET")
            .done()
            .build();
        assert_eq!(ncco.to_value().unwrap()[0]["eventMethod"], "GET");
    }

    #[test]
    fn test_unset_options_are_omitted() {
        let ncco = NccoBuilder::new()
            .talk("plain")
            .done()
            .stream(["https://example.com/a.mp3"])
            .done()
            .record()
            .done()
            .build();

        assert_eq!(
            ncco.to_value().unwrap(),
            json!([
                {"action": "talk", "text": "plain"},
                {"action": "stream", "streamUrl": ["https://example.com/a.mp3"]},
                {"action": "record"}
            ])
        );
    }

    #[test]
    fn test_input_settings_nest_under_modality() {
        let ncco = NccoBuilder::new()
            .input()
            .speech()
            .dtmf()
            .speech()
            .event_url("https://example.com/asr")
            .end_on_silence(1.5)
            .start_timeout(5)
            .speech_context(["yes", "no"])
            .max_digits(4)
            .submit_on_hash()
            .done()
            .build();

        assert_eq!(
            ncco.to_value().unwrap(),
            json!([{
                "action": "input",
                "type": ["speech", "dtmf"],
                "eventUrl": ["https://example.com/asr"],
                "eventMethod": "POST",
                "speech": {"endOnSilence": 1.5, "startTimeout": 5, "context": ["yes", "no"]},
                "dtmf": {"maxDigits": 4, "submitOnHash": true}
            }])
        );
    }

    #[test]
    fn test_talk_options_use_wire_names() {
        let ncco = NccoBuilder::new()
            .talk("hello")
            .japanese()
            .style(2)
            .premium()
            .level(0.5)
            .barge_in()
            .loop_count(3)
            .done()
            .build();

        assert_eq!(
            ncco.to_value().unwrap()[0],
            json!({
                "action": "talk",
                "text": "hello",
                "voiceName": "Mizuki",
                "language": "ja-JP",
                "style": 2,
                "premium": true,
                "level": 0.5,
                "bargeIn": true,
                "loop": 3
            })
        );
    }

    #[test]
    fn test_level_is_not_range_checked() {
        let ncco = NccoBuilder::new().stream(["u"]).level(7.0).done().build();
        assert_eq!(ncco.to_value().unwrap()[0]["level"], 7.0);
    }

    #[test]
    fn test_record_and_notify() {
        let mut payload = Map::new();
        payload.insert("step".to_string(), json!("recorded"));

        let ncco = NccoBuilder::new()
            .record()
            .format(RecordFormat::Wav)
            .end_on_key("#")
            .beep_start()
            .split()
            .channels(2)
            .event_url("https://example.com/rec")
            .done()
            .notify("https://example.com/notify", payload)
            .build();

        assert_eq!(
            ncco.to_value().unwrap(),
            json!([
                {
                    "action": "record",
                    "format": "wav",
                    "endOnKey": "#",
                    "beepStart": true,
                    "eventUrl": ["https://example.com/rec"],
                    "split": "conversation",
                    "channels": 2
                },
                {
                    "action": "notify",
                    "payload": {"step": "recorded"},
                    "eventUrl": ["https://example.com/notify"],
                    "eventMethod": "POST"
                }
            ])
        );
    }

    #[test]
    fn test_program_parses_back() {
        let text = r#"[{"action":"talk","text":"hi"},{"action":"input","type":["dtmf"],"dtmf":{"maxDigits":1}}]"#;
        let ncco: Ncco = serde_json::from_str(text).unwrap();

        let names: Vec<_> = ncco.iter().map(Action::name).collect();
        assert_eq!(names, ["talk", "input"]);
        match &ncco.actions()[1] {
            Action::Input(input) => assert_eq!(input.dtmf.as_ref().unwrap().max_digits, Some(1)),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_empty_program() {
        let ncco = NccoBuilder::new().build();
        assert!(ncco.is_empty());
        assert_eq!(ncco.to_json().unwrap(), "[]");
    }
}
