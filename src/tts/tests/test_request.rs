use crate::config::SynthesisDefaults;
use crate::tts::SynthesisRequest;

fn request(text: &str) -> SynthesisRequest {
    SynthesisRequest::new(text, "voice-a", &SynthesisDefaults::default())
}

#[test]
fn test_same_fields_same_filename() {
    assert_eq!(request("bonjour").filename(), request("bonjour").filename());
}

#[test]
fn test_filename_shape() {
    let name = request("bonjour").filename();
    let (digest, ext) = name.split_once('.').unwrap();
    assert_eq!(ext, "mp3");
    assert_eq!(digest.len(), 12);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_speaking_rate_changes_key() {
    let defaults = SynthesisDefaults::default();
    let normal = request("bonjour");
    let faster = request("bonjour").with_speaking_rate(1.1, &defaults);
    assert_ne!(normal.digest(), faster.digest());
}

#[test]
fn test_every_field_changes_key() {
    let base = request("bonjour");
    let variants = vec![
        base.with_text("bonsoir"),
        base.with_voice("voice-b"),
        SynthesisRequest { model_id: "eleven_turbo_v2".into(), ..base.clone() },
        SynthesisRequest { stability: 0.5, ..base.clone() },
        SynthesisRequest { similarity_boost: 0.9, ..base.clone() },
        SynthesisRequest { style: 0.2, ..base.clone() },
        SynthesisRequest { use_speaker_boost: false, ..base.clone() },
        SynthesisRequest { output_format: "mp3_44100_128".into(), ..base.clone() },
    ];
    for variant in variants {
        assert_ne!(base.digest(), variant.digest(), "{:?}", variant);
    }
}

#[test]
fn test_fields_cannot_be_glued_together() {
    let a = SynthesisRequest::new("ab", "c", &SynthesisDefaults::default());
    let b = SynthesisRequest::new("a", "bc", &SynthesisDefaults::default());
    assert_ne!(a.digest(), b.digest());
}

#[test]
fn test_speaking_rate_is_clamped() {
    let defaults = SynthesisDefaults::default();
    assert_eq!(request("x").with_speaking_rate(3.0, &defaults).speaking_rate, 1.2);
    assert_eq!(request("x").with_speaking_rate(0.1, &defaults).speaking_rate, 0.7);
    assert_eq!(request("x").with_speaking_rate(f32::NAN, &defaults).speaking_rate, 1.0);
    // Значения за пределами диапазона дают тот же ключ, что и граница
    assert_eq!(
        request("x").with_speaking_rate(3.0, &defaults).digest(),
        request("x").with_speaking_rate(1.2, &defaults).digest()
    );
}

#[test]
fn test_inverted_rate_bounds_do_not_panic() {
    let defaults = SynthesisDefaults {
        min_speaking_rate: 1.2,
        max_speaking_rate: 0.7,
        ..SynthesisDefaults::default()
    };
    let request = SynthesisRequest::new("x", "voice-a", &defaults);
    assert!(request.speaking_rate.is_finite());

    let nan_bounds = SynthesisDefaults {
        min_speaking_rate: f32::NAN,
        ..SynthesisDefaults::default()
    };
    let request =
        SynthesisRequest::new("x", "voice-a", &nan_bounds).with_speaking_rate(2.0, &nan_bounds);
    assert_eq!(request.speaking_rate, 1.2);
}
