//! Voice search orchestration and session behavior with mock clients.

use async_trait::async_trait;
use dogsh::audio::capture::{CaptureProgress, CaptureState, Recorder, Recording};
use dogsh::breed::{BreedPath, BreedQuery};
use dogsh::config::{Config, ConfigSource, StaticConfigSource, Voice};
use dogsh::error::{DogshError, Result};
use dogsh::image::{DogApiClient, DogImage, ImageSource};
use dogsh::phrase::PHRASES;
use dogsh::pipeline::{PipelineStage, SearchOutcome, VoiceSearch};
use dogsh::session::{Notice, Session};
use dogsh::speech::narrator::Speaker;
use dogsh::speech::transcribe::SpeechToBreed;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::{Notify, watch};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GOLDEN_URL: &str = "https://images.dog.ceo/breeds/retriever-golden/n02099601_100.jpg";

/// Records which stage was current when each mock was called.
#[derive(Default)]
struct StageLog {
    stage: OnceLock<watch::Receiver<PipelineStage>>,
    seen: Mutex<Vec<(&'static str, PipelineStage)>>,
}

impl StageLog {
    fn note(&self, who: &'static str) {
        let stage = self
            .stage
            .get()
            .map(|rx| *rx.borrow())
            .unwrap_or_default();
        self.seen.lock().unwrap().push((who, stage));
    }

    fn seen(&self) -> Vec<(&'static str, PipelineStage)> {
        self.seen.lock().unwrap().clone()
    }
}

struct MockRecorder {
    stages: Arc<StageLog>,
    fail: bool,
    started: Arc<Notify>,
    release: Option<Arc<Notify>>,
    files: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl Recorder for MockRecorder {
    async fn record(&self, progress: &watch::Sender<CaptureProgress>) -> Result<Recording> {
        self.stages.note("recorder");
        progress.send_replace(CaptureProgress {
            state: CaptureState::Listening,
            remaining_secs: 6,
            level: 4,
        });
        self.started.notify_one();
        if let Some(release) = &self.release {
            release.notified().await;
        }
        if self.fail {
            return Err(DogshError::ToolNotFound {
                path: "/usr/bin/sox".to_string(),
            });
        }
        let file = tempfile::NamedTempFile::new()?;
        let path = file.into_temp_path();
        self.files.lock().unwrap().push(path.to_path_buf());
        Ok(Recording::from_temp_path(path))
    }
}

struct MockTranscriber {
    stages: Arc<StageLog>,
    heard: Option<&'static str>,
}

#[async_trait]
impl SpeechToBreed for MockTranscriber {
    async fn transcribe(&self, recording: Recording) -> Result<BreedQuery> {
        self.stages.note("transcriber");
        recording.discard();
        match self.heard {
            Some(text) => BreedQuery::from_text(text),
            None => Err(DogshError::Transcription {
                message: "service returned 500".to_string(),
            }),
        }
    }
}

enum ImageReply {
    Found(&'static str),
    NotFound,
    Down,
}

struct MockImages {
    stages: Arc<StageLog>,
    reply: ImageReply,
    requested: Mutex<Vec<Option<String>>>,
}

#[async_trait]
impl ImageSource for MockImages {
    async fn fetch(&self, breed: Option<&BreedPath>) -> Result<DogImage> {
        self.stages.note("images");
        self.requested
            .lock()
            .unwrap()
            .push(breed.map(|b| b.to_string()));
        match self.reply {
            ImageReply::Found(url) => Ok(DogImage::from_url(url)),
            ImageReply::NotFound => Err(DogshError::BreedNotFound {
                path: breed.map(|b| b.to_string()).unwrap_or_default(),
            }),
            ImageReply::Down => Err(DogshError::Fetch {
                message: "connection refused".to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct MockSpeaker {
    fail: bool,
    spoken: Mutex<Vec<(String, Option<Voice>)>>,
}

#[async_trait]
impl Speaker for MockSpeaker {
    async fn speak_as(&self, text: &str, voice: Option<Voice>) -> Result<()> {
        self.spoken.lock().unwrap().push((text.to_string(), voice));
        if self.fail {
            return Err(DogshError::Synthesis {
                message: "quota exceeded".to_string(),
            });
        }
        Ok(())
    }
}

struct Harness {
    stages: Arc<StageLog>,
    recorder: Arc<MockRecorder>,
    transcriber: Arc<MockTranscriber>,
    images: Arc<MockImages>,
    speaker: Arc<MockSpeaker>,
    search: Arc<VoiceSearch>,
}

struct Setup {
    record_fails: bool,
    release: Option<Arc<Notify>>,
    heard: Option<&'static str>,
    reply: ImageReply,
    speaker_fails: bool,
    narration: bool,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            record_fails: false,
            release: None,
            heard: Some("golden retriever"),
            reply: ImageReply::Found(GOLDEN_URL),
            speaker_fails: false,
            narration: true,
        }
    }
}

fn config(narration: bool) -> Arc<dyn ConfigSource> {
    let mut config = Config::default();
    config.narration.enabled = narration;
    Arc::new(StaticConfigSource(config))
}

fn harness(setup: Setup) -> Harness {
    let stages = Arc::new(StageLog::default());
    let recorder = Arc::new(MockRecorder {
        stages: stages.clone(),
        fail: setup.record_fails,
        started: Arc::new(Notify::new()),
        release: setup.release,
        files: Mutex::new(Vec::new()),
    });
    let transcriber = Arc::new(MockTranscriber {
        stages: stages.clone(),
        heard: setup.heard,
    });
    let images = Arc::new(MockImages {
        stages: stages.clone(),
        reply: setup.reply,
        requested: Mutex::new(Vec::new()),
    });
    let speaker = Arc::new(MockSpeaker {
        fail: setup.speaker_fails,
        ..Default::default()
    });
    let search = Arc::new(VoiceSearch::new(
        config(setup.narration),
        recorder.clone(),
        transcriber.clone(),
        images.clone(),
        speaker.clone(),
    ));
    let _ = stages.stage.set(search.subscribe());

    Harness {
        stages,
        recorder,
        transcriber,
        images,
        speaker,
        search,
    }
}

async fn finish_narration(outcome: SearchOutcome) -> SearchOutcome {
    match outcome {
        SearchOutcome::Found {
            query,
            image,
            narration,
        } => {
            if let Some(handle) = narration {
                handle.await.unwrap();
            }
            SearchOutcome::Found {
                query,
                image,
                narration: None,
            }
        }
        other => other,
    }
}

// ── Orchestrator ──────────────────────────────────────────────────

#[tokio::test]
async fn successful_search_walks_every_stage() {
    let h = harness(Setup::default());

    let outcome = finish_narration(h.search.run().await).await;

    match outcome {
        SearchOutcome::Found { query, image, .. } => {
            assert_eq!(query.raw, "golden retriever");
            assert_eq!(query.path.as_str(), "retriever/golden");
            assert_eq!(image.url, GOLDEN_URL);
            assert_eq!(image.breed, "golden retriever");
        }
        other => panic!("Expected Found, got: {other:?}"),
    }
    assert_eq!(
        h.stages.seen(),
        vec![
            ("recorder", PipelineStage::Listening),
            ("transcriber", PipelineStage::Transcribing),
            ("images", PipelineStage::Searching),
        ]
    );
    assert_eq!(
        *h.images.requested.lock().unwrap(),
        vec![Some("retriever/golden".to_string())]
    );
    assert_eq!(h.search.stage(), PipelineStage::Idle);
}

#[tokio::test]
async fn found_image_is_narrated_with_a_phrase() {
    let h = harness(Setup::default());

    finish_narration(h.search.run().await).await;

    let spoken = h.speaker.spoken.lock().unwrap();
    assert_eq!(spoken.len(), 1);
    let (text, voice) = &spoken[0];
    assert_eq!(*voice, None);
    assert!(text.ends_with(" golden retriever"), "got: {text}");
    assert!(
        PHRASES.iter().any(|p| text.starts_with(p)),
        "unexpected phrase: {text}"
    );
}

#[tokio::test]
async fn recording_is_removed_after_run() {
    let h = harness(Setup::default());

    finish_narration(h.search.run().await).await;

    let files = h.recorder.files.lock().unwrap();
    assert_eq!(files.len(), 1);
    assert!(!files[0].exists());
}

#[tokio::test]
async fn unknown_breed_reports_not_found() {
    let h = harness(Setup {
        heard: Some("wolf dog"),
        reply: ImageReply::NotFound,
        ..Default::default()
    });

    match h.search.run().await {
        SearchOutcome::BreedNotFound { query } => {
            assert_eq!(query.raw, "wolf dog");
            assert_eq!(query.path.as_str(), "dog/wolf");
        }
        other => panic!("Expected BreedNotFound, got: {other:?}"),
    }
    assert!(h.speaker.spoken.lock().unwrap().is_empty());
    assert_eq!(h.search.stage(), PipelineStage::Idle);
}

#[tokio::test]
async fn recording_failure_stops_at_listening() {
    let h = harness(Setup {
        record_fails: true,
        ..Default::default()
    });

    match h.search.run().await {
        SearchOutcome::Failed { stage, message } => {
            assert_eq!(stage, PipelineStage::Listening);
            assert!(message.contains("/usr/bin/sox"), "got: {message}");
        }
        other => panic!("Expected Failed, got: {other:?}"),
    }
    assert_eq!(h.stages.seen().len(), 1);
    assert_eq!(h.search.stage(), PipelineStage::Idle);
}

#[tokio::test]
async fn transcription_failure_skips_search() {
    let h = harness(Setup {
        heard: None,
        ..Default::default()
    });

    match h.search.run().await {
        SearchOutcome::Failed { stage, .. } => assert_eq!(stage, PipelineStage::Transcribing),
        other => panic!("Expected Failed, got: {other:?}"),
    }
    assert!(h.images.requested.lock().unwrap().is_empty());
    assert_eq!(h.search.stage(), PipelineStage::Idle);
}

#[tokio::test]
async fn image_service_failure_is_reported_at_searching() {
    let h = harness(Setup {
        reply: ImageReply::Down,
        ..Default::default()
    });

    match h.search.run().await {
        SearchOutcome::Failed { stage, message } => {
            assert_eq!(stage, PipelineStage::Searching);
            assert!(message.contains("connection refused"), "got: {message}");
        }
        other => panic!("Expected Failed, got: {other:?}"),
    }
}

#[tokio::test]
async fn narration_failure_does_not_change_outcome() {
    let h = harness(Setup {
        speaker_fails: true,
        ..Default::default()
    });

    let outcome = finish_narration(h.search.run().await).await;

    assert!(matches!(outcome, SearchOutcome::Found { .. }), "got: {outcome:?}");
    assert_eq!(h.speaker.spoken.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn narration_disabled_starts_no_task() {
    let h = harness(Setup {
        narration: false,
        ..Default::default()
    });

    match h.search.run().await {
        SearchOutcome::Found { narration, .. } => assert!(narration.is_none()),
        other => panic!("Expected Found, got: {other:?}"),
    }
    assert!(h.speaker.spoken.lock().unwrap().is_empty());
}

#[tokio::test]
async fn second_run_while_active_is_busy() {
    let release = Arc::new(Notify::new());
    let h = harness(Setup {
        release: Some(release.clone()),
        ..Default::default()
    });

    let first = tokio::spawn({
        let search = h.search.clone();
        async move { finish_narration(search.run().await).await }
    });
    h.recorder.started.notified().await;
    assert_eq!(h.search.stage(), PipelineStage::Listening);
    assert_eq!(h.search.progress().remaining_secs, 6);

    let second = h.search.run().await;
    assert!(matches!(second, SearchOutcome::Busy), "got: {second:?}");
    assert_eq!(h.search.stage(), PipelineStage::Listening);

    release.notify_one();
    let first = first.await.unwrap();
    assert!(matches!(first, SearchOutcome::Found { .. }), "got: {first:?}");
    assert_eq!(h.stages.seen().len(), 3);
    assert_eq!(h.search.stage(), PipelineStage::Idle);
}

#[tokio::test]
async fn search_can_run_again_after_finishing() {
    let h = harness(Setup {
        reply: ImageReply::NotFound,
        ..Default::default()
    });

    assert!(matches!(
        h.search.run().await,
        SearchOutcome::BreedNotFound { .. }
    ));
    assert!(matches!(
        h.search.run().await,
        SearchOutcome::BreedNotFound { .. }
    ));
    assert_eq!(h.images.requested.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn dog_api_404_ends_idle_with_breed_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/breed/dog/wolf/images/random"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "status": "error",
            "message": "Breed not found (main breed does not exist)",
            "code": 404
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.image.base_url = format!("{}/api", server.uri());
    let config: Arc<dyn ConfigSource> = Arc::new(StaticConfigSource(config));

    let stages = Arc::new(StageLog::default());
    let speaker = Arc::new(MockSpeaker::default());
    let search = VoiceSearch::new(
        config.clone(),
        Arc::new(MockRecorder {
            stages: stages.clone(),
            fail: false,
            started: Arc::new(Notify::new()),
            release: None,
            files: Mutex::new(Vec::new()),
        }),
        Arc::new(MockTranscriber {
            stages: stages.clone(),
            heard: Some("wolf dog"),
        }),
        Arc::new(DogApiClient::new(config)),
        speaker.clone(),
    );

    match search.run().await {
        SearchOutcome::BreedNotFound { query } => {
            assert_eq!(query.raw, "wolf dog");
            assert_eq!(query.path.as_str(), "dog/wolf");
        }
        other => panic!("Expected BreedNotFound, got: {other:?}"),
    }
    assert_eq!(search.stage(), PipelineStage::Idle);
    assert!(speaker.spoken.lock().unwrap().is_empty());
}

// ── Session ───────────────────────────────────────────────────────

fn session(setup: Setup) -> (Session, Harness) {
    let narration = setup.narration;
    let h = harness(setup);
    let search = VoiceSearch::new(
        config(narration),
        h.recorder.clone(),
        h.transcriber.clone(),
        h.images.clone(),
        h.speaker.clone(),
    );
    let session = Session::new(
        config(narration),
        h.images.clone(),
        h.speaker.clone(),
        search,
    );
    (session, h)
}

#[tokio::test]
async fn session_new_image_shows_breed_and_narrates() {
    let (mut session, h) = session(Setup::default());

    session.new_random_image(None).await;
    session.wait_for_narration().await;

    let image = session.state().image.clone().unwrap();
    assert_eq!(image.breed, "golden retriever");
    assert_eq!(*h.images.requested.lock().unwrap(), vec![None]);
    assert_eq!(h.speaker.spoken.lock().unwrap().len(), 1);
    assert!(session.render().contains("Breed: golden retriever"));
}

#[tokio::test]
async fn session_typed_breed_is_normalized() {
    let (mut session, h) = session(Setup::default());

    session.new_random_image(Some("Golden Retriever!")).await;

    assert_eq!(
        *h.images.requested.lock().unwrap(),
        vec![Some("retriever/golden".to_string())]
    );
}

#[tokio::test]
async fn session_unknown_breed_is_a_warning() {
    let (mut session, _h) = session(Setup {
        reply: ImageReply::NotFound,
        ..Default::default()
    });

    session.new_random_image(Some("wolfdog")).await;

    assert!(session.state().image.is_none());
    assert!(matches!(session.state().notice, Some(Notice::Warning(_))));
    assert!(session.render().contains("Could not find breed 'wolfdog'"));
}

#[tokio::test]
async fn session_voice_search_keeps_transcript() {
    let (mut session, _h) = session(Setup::default());

    session.start_voice_search().await;
    session.wait_for_narration().await;

    let view = session.render();
    assert!(view.contains("Heard: \"golden retriever\""), "got: {view}");
    assert!(view.contains("Breed: golden retriever"), "got: {view}");
}

#[tokio::test]
async fn session_speak_without_image_is_info() {
    let (mut session, h) = session(Setup::default());

    session.speak_current_breed().await;

    assert!(matches!(session.state().notice, Some(Notice::Info(_))));
    assert!(h.speaker.spoken.lock().unwrap().is_empty());
}

#[tokio::test]
async fn session_test_voice_uses_requested_voice() {
    let (mut session, h) = session(Setup::default());

    session.test_selected_voice(Some(Voice::Shimmer)).await;
    session.test_selected_voice(None).await;

    let spoken = h.speaker.spoken.lock().unwrap();
    assert_eq!(
        *spoken,
        vec![
            (
                "Woof! This is the shimmer voice.".to_string(),
                Some(Voice::Shimmer)
            ),
            (
                "Woof! This is the alloy voice.".to_string(),
                Some(Voice::Alloy)
            ),
        ]
    );
}

#[tokio::test]
async fn session_narration_failure_never_breaks_the_view() {
    let (mut session, _h) = session(Setup {
        speaker_fails: true,
        ..Default::default()
    });

    session.new_random_image(None).await;
    session.wait_for_narration().await;

    assert!(session.state().image.is_some());
    assert_eq!(session.state().notice, None);
}
