mod common;

use common::{created, field, form_fields, header, reply, resolve, send, Tester};

use shared::capabilities::{LocationOutput, TimerOutput};
use shared::transport::{IncidentKind, MediaAttachment, Severity};
use shared::view_state::View;
use shared::{Event, Model};

fn on_report_form() -> (Tester, Model) {
    let app = Tester::default();
    let mut model = Model::default();
    send(&app, Event::Navigate(View::Report), &mut model);
    (app, model)
}

#[test]
fn empty_form_submits_defaults() {
    let (app, mut model) = on_report_form();
    let view = app.view(&model);
    assert_eq!(view.report.kind, IncidentKind::Flood);
    assert_eq!(view.report.severity, Severity::Medium);
    assert_eq!(view.report.submit_label, "Submit Report");
    assert_eq!(view.report.media_label, "Click to upload images or videos");

    let mut effects = send(&app, Event::ReportSubmitted, &mut model);
    let submit = effects.take_http("/api/incidents");
    let fields = form_fields(&submit);
    assert_eq!(field(&fields, "type"), "flood");
    assert_eq!(field(&fields, "severity"), "medium");
    assert_eq!(field(&fields, "location"), "Unknown");
    assert_eq!(field(&fields, "description"), "");
}

#[test]
fn success_confirms_resets_and_opens_dashboard() {
    let (app, mut model) = on_report_form();
    send(&app, Event::ReportKindSelected(IncidentKind::Fire), &mut model);
    send(&app, Event::ReportSeveritySelected(Severity::High), &mut model);
    send(
        &app,
        Event::ReportLocationEdited("Civic Center".into()),
        &mut model,
    );
    send(
        &app,
        Event::ReportDescriptionEdited("Smoke on the 3rd floor".into()),
        &mut model,
    );

    let mut effects = send(&app, Event::ReportSubmitted, &mut model);
    let view = app.view(&model);
    assert_eq!(view.report.submit_label, "Uploading...");
    assert!(!view.report.submit_enabled);

    let again = send(&app, Event::ReportSubmitted, &mut model);
    assert!(again.http.is_empty(), "double submit while uploading");

    let mut submit = effects.take_http("/api/incidents");
    let fields = form_fields(&submit);
    assert_eq!(field(&fields, "type"), "fire");
    assert_eq!(field(&fields, "severity"), "high");
    assert_eq!(field(&fields, "location"), "Civic Center");

    let mut after = resolve(&app, &mut model, &mut submit, created(12));
    assert_eq!(app.view(&model).report.submit_label, "Report Submitted");

    let mut confirm = after.take_timer(1_500);
    let dashboard = resolve(&app, &mut model, &mut confirm, TimerOutput::Elapsed);

    let view = app.view(&model);
    assert_eq!(view.active_view, View::Dashboard);
    assert_eq!(view.report.submit_label, "Submit Report");
    assert!(view.report.submit_enabled);
    assert_eq!(view.report.location, "");
    assert_eq!(view.report.kind, IncidentKind::Flood);
    assert!(!dashboard.http.is_empty());
}

#[test]
fn failure_shows_error_then_allows_resubmission() {
    let (app, mut model) = on_report_form();
    send(
        &app,
        Event::ReportDescriptionEdited("Bridge out on Route 9".into()),
        &mut model,
    );

    let mut effects = send(&app, Event::ReportSubmitted, &mut model);
    let mut submit = effects.take_http("/api/incidents");
    let rejected = reply(500, r#"{"error":"Database Error"}"#);
    let mut after = resolve(&app, &mut model, &mut submit, rejected);

    let view = app.view(&model);
    assert_eq!(view.report.submit_label, "Error");
    assert!(view.report.error.is_some_and(|e| e.contains("500")));
    assert_eq!(view.active_view, View::Report);

    let mut reenable = after.take_timer(2_000);
    resolve(&app, &mut model, &mut reenable, TimerOutput::Elapsed);

    let view = app.view(&model);
    assert_eq!(view.report.submit_label, "Submit Report");
    assert!(view.report.submit_enabled);
    assert_eq!(view.report.description, "Bridge out on Route 9");

    let mut retry = send(&app, Event::ReportSubmitted, &mut model);
    retry.take_http("/api/incidents");
    assert!(app.view(&model).report.error.is_none());
}

#[test]
fn media_switches_to_multipart() {
    let (app, mut model) = on_report_form();
    send(
        &app,
        Event::ReportMediaAttached(Box::new(MediaAttachment {
            file_name: "levee.jpg".into(),
            mime_type: "image/jpeg".into(),
            bytes: vec![0xff, 0xd8, 0xff, 0xe0],
        })),
        &mut model,
    );
    assert_eq!(
        app.view(&model).report.media_label,
        "Media Attached: levee.jpg"
    );

    let mut effects = send(&app, Event::ReportSubmitted, &mut model);
    let submit = effects.take_http("/api/incidents");
    assert!(header(&submit, "Content-Type")
        .is_some_and(|v| v.starts_with("multipart/form-data; boundary=")));
    let body = String::from_utf8_lossy(&submit.operation.body);
    assert!(body.contains("filename=\"levee.jpg\""));
    assert!(body.contains("name=\"severity\""));

    send(&app, Event::ReportMediaCleared, &mut model);
    assert_eq!(
        app.view(&model).report.media_label,
        "Click to upload images or videos"
    );
}

#[test]
fn locate_me_fills_the_location_field() {
    let (app, mut model) = on_report_form();
    let mut effects = send(&app, Event::ReportLocateRequested, &mut model);
    assert_eq!(app.view(&model).report.location, "Locating via Satellite...");

    let mut query = effects.location.remove(0);
    resolve(
        &app,
        &mut model,
        &mut query,
        LocationOutput::Position {
            latitude: 34.05223,
            longitude: -118.24368,
            accuracy_m: Some(20.0),
        },
    );
    let view = app.view(&model);
    assert_eq!(view.report.location, "34.0522, -118.2437 (Auto-detected)");
    assert!(view.notice.is_none());
}

#[test]
fn denied_locate_uses_default_and_notifies() {
    let (app, mut model) = on_report_form();
    let mut effects = send(&app, Event::ReportLocateRequested, &mut model);
    let mut query = effects.location.remove(0);
    resolve(&app, &mut model, &mut query, LocationOutput::PermissionDenied);

    let view = app.view(&model);
    assert_eq!(view.report.location, "34.0522, -118.2437 (Default)");
    assert_eq!(
        view.notice.as_deref(),
        Some("Location access denied. Using center coordinates.")
    );

    send(&app, Event::DismissNotice, &mut model);
    assert!(app.view(&model).notice.is_none());
}

#[test]
fn missing_geolocation_reports_unsupported() {
    let (app, mut model) = on_report_form();
    let mut effects = send(&app, Event::ReportLocateRequested, &mut model);
    let mut query = effects.location.remove(0);
    resolve(&app, &mut model, &mut query, LocationOutput::Unsupported);
    assert_eq!(app.view(&model).report.location, "GPS Not Supported");
}
