use std::sync::Arc;

use crate::config::SynthesisDefaults;
use crate::error::AppError;
use crate::tts::fake::FakeProvider;
use crate::tts::{FailoverSynthesizer, SynthesisCache, SynthesisRequest};

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn template() -> SynthesisRequest {
    SynthesisRequest::new("", "", &SynthesisDefaults::default())
}

fn synthesizer(provider: Arc<FakeProvider>, dir: &std::path::Path) -> FailoverSynthesizer {
    FailoverSynthesizer::new(SynthesisCache::new(provider, dir))
}

#[tokio::test]
async fn test_rejected_voice_moves_to_next() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::default().reject("famous"));
    let synth = synthesizer(provider.clone(), dir.path());

    let artifact = synth
        .synthesize_with_failover("bonjour", &ids(&["famous", "plain"]), &template())
        .await
        .unwrap();

    assert_eq!(provider.synth_voice_order(), ids(&["famous", "plain"]));
    assert_eq!(
        std::fs::read(&artifact.local_path).unwrap(),
        b"ID3:plain:bonjour".to_vec()
    );
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::default().break_voice("first"));
    let synth = synthesizer(provider.clone(), dir.path());

    let result = synth
        .synthesize_with_failover("bonjour", &ids(&["first", "second"]), &template())
        .await;

    assert!(matches!(result, Err(AppError::SynthesisError(_))));
    assert_eq!(provider.synth_voice_order(), ids(&["first"]));
}

#[tokio::test]
async fn test_all_rejected_reports_tried_voices() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::default().reject("a").reject("b"));
    let synth = synthesizer(provider.clone(), dir.path());

    let err = synth
        .synthesize_with_failover("bonjour", &ids(&["a", "b"]), &template())
        .await
        .unwrap_err();

    match err {
        AppError::VoicesExhausted { tried, last } => {
            assert_eq!(tried, ids(&["a", "b"]));
            assert!(last.is_voice_ineligible());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_duplicate_and_empty_ids_tried_once() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::default().reject("a"));
    let synth = synthesizer(provider.clone(), dir.path());

    let _ = synth
        .synthesize_with_failover("bonjour", &ids(&["a", "", "a"]), &template())
        .await;

    assert_eq!(provider.synth_voice_order(), ids(&["a"]));
}

#[tokio::test]
async fn test_empty_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::default());
    let synth = synthesizer(provider.clone(), dir.path());

    let result = synth.synthesize_with_failover("bonjour", &[], &template()).await;
    assert!(matches!(result, Err(AppError::NoEligibleVoice(_))));
    assert!(provider.synth_calls().is_empty());
}

#[tokio::test]
async fn test_template_settings_carried_over() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::default());
    let synth = synthesizer(provider.clone(), dir.path());
    let defaults = SynthesisDefaults::default();
    let template = template().with_speaking_rate(0.8, &defaults);

    synth
        .synthesize_with_failover("lentement", &ids(&["v"]), &template)
        .await
        .unwrap();

    let calls = provider.synth_calls();
    assert_eq!(calls[0].text, "lentement");
    assert_eq!(calls[0].voice_id, "v");
    assert_eq!(calls[0].speaking_rate, 0.8);
}

#[tokio::test]
async fn test_shuffle_still_tries_every_voice() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::default().reject("a").reject("b").reject("c"));
    let synth = synthesizer(provider.clone(), dir.path()).with_shuffle(true);

    let result = synth
        .synthesize_with_failover("bonjour", &ids(&["a", "b", "c"]), &template())
        .await;
    assert!(matches!(result, Err(AppError::VoicesExhausted { .. })));

    let mut order = provider.synth_voice_order();
    order.sort();
    assert_eq!(order, ids(&["a", "b", "c"]));
}
