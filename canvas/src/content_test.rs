use uuid::Uuid;

use super::*;
use crate::camera::Point;
use crate::doc::{ContentData, ElementData, TextData};

fn store_with_card() -> (DocStore, ElementId) {
    let mut doc = DocStore::with_clock(|| 42);
    let el = CanvasElement::new(
        Uuid::new_v4(),
        ElementData::Content(ContentData {
            url: "https://www.tiktok.com/@x/video/1".into(),
            platform: Platform::Tiktok,
            ..Default::default()
        }),
        Point::new(0.0, 0.0),
        0,
    );
    let id = el.id;
    doc.add_element(el).unwrap();
    (doc, id)
}

fn meta(doc: &DocStore, id: &ElementId) -> crate::doc::ContentMetadata {
    doc.get(id).unwrap().as_content().unwrap().metadata.clone()
}

fn sample_analysis() -> Analysis {
    Analysis {
        hook_analysis: "strong open".into(),
        key_topics: vec!["fitness".into()],
        sentiment: "positive".into(),
        ..Default::default()
    }
}

// =============================================================
// Validation
// =============================================================

#[test]
fn parse_instagram_url() {
    let (_, platform) = parse_content_url("https://www.instagram.com/reel/xyz/").unwrap();
    assert_eq!(platform, Platform::Instagram);
}

#[test]
fn parse_short_youtube_url() {
    let (_, platform) = parse_content_url("  https://youtu.be/dQw4w9WgXcQ ").unwrap();
    assert_eq!(platform, Platform::Youtube);
}

#[test]
fn parse_unknown_host_is_unknown_platform() {
    let (_, platform) = parse_content_url("https://example.com/a").unwrap();
    assert_eq!(platform, Platform::Unknown);
}

#[test]
fn parse_rejects_plain_text() {
    assert!(matches!(parse_content_url("just some words"), Err(ContentError::InvalidUrl(_))));
}

#[test]
fn parse_rejects_non_http_scheme() {
    assert!(matches!(parse_content_url("ftp://tiktok.com/x"), Err(ContentError::UnsupportedScheme(_))));
}

#[test]
fn platform_match_is_case_insensitive() {
    assert_eq!(platform_for_host("M.TikTok.com"), Platform::Tiktok);
}

#[test]
fn normalize_handle_strips_at() {
    assert_eq!(normalize_handle("@some.creator_1").unwrap(), "some.creator_1");
}

#[test]
fn normalize_handle_rejects_spaces_and_empty() {
    assert!(normalize_handle("two words").is_err());
    assert!(normalize_handle("@").is_err());
    assert!(normalize_handle(&"a".repeat(31)).is_err());
}

// =============================================================
// Lifecycle
// =============================================================

#[test]
fn scrape_started_sets_flag_and_id() {
    let (mut doc, id) = store_with_card();
    assert!(apply_ingest_event(&mut doc, &id, IngestEvent::ScrapeStarted { scrape_id: Some("s1".into()) }));
    let m = meta(&doc, &id);
    assert!(m.is_scraping);
    assert_eq!(m.scrape_id.as_deref(), Some("s1"));
}

#[test]
fn scrape_completed_fills_card() {
    let (mut doc, id) = store_with_card();
    let content = ScrapedContent {
        title: Some("Leg day".into()),
        thumbnail_url: Some("https://cdn/x.jpg".into()),
        likes: Some(10),
        views: Some(1000),
        ..Default::default()
    };
    assert!(apply_ingest_event(&mut doc, &id, IngestEvent::ScrapeCompleted { scrape_id: Some("s1".into()), content }));
    let el = doc.get(&id).unwrap().as_content().unwrap();
    assert_eq!(el.title, "Leg day");
    assert_eq!(el.thumbnail_url.as_deref(), Some("https://cdn/x.jpg"));
    assert!(el.metadata.is_scraped);
    assert!(!el.metadata.is_scraping);
    assert_eq!(el.metadata.likes, 10);
    assert_eq!(el.metadata.views, 1000);
    assert_eq!(el.metadata.comments, 0);
}

#[test]
fn duplicate_scrape_completion_is_noop() {
    let (mut doc, id) = store_with_card();
    let event = IngestEvent::ScrapeCompleted { scrape_id: None, content: ScrapedContent::default() };
    assert!(apply_ingest_event(&mut doc, &id, event.clone()));
    let rev = doc.revision();
    assert!(!apply_ingest_event(&mut doc, &id, event));
    assert_eq!(doc.revision(), rev);
}

#[test]
fn late_failure_after_completion_is_ignored() {
    let (mut doc, id) = store_with_card();
    apply_ingest_event(&mut doc, &id, IngestEvent::ScrapeCompleted { scrape_id: None, content: ScrapedContent::default() });
    assert!(!apply_ingest_event(&mut doc, &id, IngestEvent::ScrapeFailed { error: "boom".into() }));
    assert!(meta(&doc, &id).scraping_error.is_none());
}

#[test]
fn timeout_records_timeout_message() {
    let (mut doc, id) = store_with_card();
    apply_ingest_event(&mut doc, &id, IngestEvent::ScrapeStarted { scrape_id: None });
    assert!(apply_ingest_event(&mut doc, &id, IngestEvent::ScrapeTimedOut));
    let m = meta(&doc, &id);
    assert!(!m.is_scraping);
    assert_eq!(m.scraping_error.as_deref(), Some(TIMEOUT_MESSAGE));
}

#[test]
fn analysis_completed_twice_does_not_duplicate() {
    let (mut doc, id) = store_with_card();
    assert!(apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisStarted));
    assert!(apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisCompleted { analysis: sample_analysis() }));
    let first = meta(&doc, &id);

    assert!(!apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisCompleted { analysis: Analysis::default() }));
    assert!(!apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisStarted));
    let second = meta(&doc, &id);

    assert_eq!(first, second);
    assert!(second.is_analyzed);
    assert!(!second.is_analyzing);
    assert_eq!(second.analysis, Some(sample_analysis()));
}

#[test]
fn analysis_failure_counts_retries() {
    let (mut doc, id) = store_with_card();
    apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisStarted);
    apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisFailed { error: "429".into() });
    apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisStarted);
    apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisFailed { error: "429".into() });
    let m = meta(&doc, &id);
    assert_eq!(m.analysis_retry_count, 2);
    assert_eq!(m.analysis_error.as_deref(), Some("429"));
    assert!(!m.is_analyzing);
}

#[test]
fn event_for_deleted_element_is_discarded() {
    let (mut doc, id) = store_with_card();
    doc.delete_element(&id);
    assert!(!apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisStarted));
}

#[test]
fn event_for_text_element_is_ignored() {
    let mut doc = DocStore::new();
    let el = CanvasElement::new(Uuid::new_v4(), ElementData::Text(TextData::default()), Point::new(0.0, 0.0), 0);
    let id = el.id;
    doc.add_element(el).unwrap();
    assert!(!apply_ingest_event(&mut doc, &id, IngestEvent::ScrapeStarted { scrape_id: None }));
}

#[test]
fn ready_for_analysis_requires_completed_scrape() {
    let (mut doc, id) = store_with_card();
    assert!(!ready_for_analysis(doc.get(&id).unwrap()));
    apply_ingest_event(&mut doc, &id, IngestEvent::ScrapeStarted { scrape_id: Some("s9".into()) });
    assert!(!ready_for_analysis(doc.get(&id).unwrap()));
    apply_ingest_event(&mut doc, &id, IngestEvent::ScrapeCompleted { scrape_id: None, content: ScrapedContent::default() });
    assert!(ready_for_analysis(doc.get(&id).unwrap()));
    apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisStarted);
    assert!(!ready_for_analysis(doc.get(&id).unwrap()));
}

#[test]
fn cancelled_analysis_makes_card_eligible_again() {
    let (mut doc, id) = store_with_card();
    apply_ingest_event(&mut doc, &id, IngestEvent::ScrapeCompleted { scrape_id: Some("s1".into()), content: ScrapedContent::default() });
    apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisStarted);
    assert!(!ready_for_analysis(doc.get(&id).unwrap()));

    assert!(apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisCancelled));
    let meta = &doc.get(&id).unwrap().as_content().unwrap().metadata;
    assert!(!meta.is_analyzing);
    assert_eq!(meta.analysis_retry_count, 0);
    assert!(ready_for_analysis(doc.get(&id).unwrap()));
    // Nothing in flight: no-op.
    assert!(!apply_ingest_event(&mut doc, &id, IngestEvent::AnalysisCancelled));
}
