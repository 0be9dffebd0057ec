#![allow(dead_code)]

use crux_core::capability::Operation;
use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};

use shared::capabilities::{LocationOperation, NavigateOperation, TimerOperation};
use shared::{App, Effect, Event, Model};

pub type Tester = AppTester<App, Effect>;

/// Effects from one or more updates, grouped by capability.
#[derive(Default)]
pub struct Effects {
    pub http: Vec<Request<HttpRequest>>,
    pub location: Vec<Request<LocationOperation>>,
    pub timer: Vec<Request<TimerOperation>>,
    pub navigate: Vec<Request<NavigateOperation>>,
    pub renders: usize,
}

impl Effects {
    pub fn absorb(&mut self, update: Update<Effect, Event>) {
        for effect in update.effects {
            match effect {
                Effect::Http(request) => self.http.push(request),
                Effect::Location(request) => self.location.push(request),
                Effect::Timer(request) => self.timer.push(request),
                Effect::Navigate(request) => self.navigate.push(request),
                Effect::Render(_) => self.renders += 1,
            }
        }
    }

    /// Removes the timer request armed for `millis`.
    pub fn take_timer(&mut self, millis: u64) -> Request<TimerOperation> {
        let index = self
            .timer
            .iter()
            .position(|r| r.operation == TimerOperation::Start { millis })
            .unwrap_or_else(|| panic!("no {millis}ms timer armed"));
        self.timer.remove(index)
    }

    /// Removes the single HTTP request for `path`.
    pub fn take_http(&mut self, path: &str) -> Request<HttpRequest> {
        let index = self
            .http
            .iter()
            .position(|r| path_of(r) == path)
            .unwrap_or_else(|| panic!("no request for {path}"));
        self.http.remove(index)
    }

    pub fn paths(&self) -> Vec<String> {
        self.http.iter().map(path_of).collect()
    }
}

/// Path part of the request URL.
pub fn path_of(request: &Request<HttpRequest>) -> String {
    url::Url::parse(&request.operation.url)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|e| panic!("bad request url {}: {e}", request.operation.url))
}

pub fn header<'a>(request: &'a Request<HttpRequest>, name: &str) -> Option<&'a str> {
    request
        .operation
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Form fields of a url-encoded submission.
pub fn form_fields(request: &Request<HttpRequest>) -> Vec<(String, String)> {
    url::form_urlencoded::parse(&request.operation.body)
        .into_owned()
        .collect()
}

pub fn field(fields: &[(String, String)], name: &str) -> String {
    fields
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
        .unwrap_or_else(|| panic!("field {name} missing"))
}

pub fn send(app: &Tester, event: Event, model: &mut Model) -> Effects {
    let mut effects = Effects::default();
    effects.absorb(app.update(event, model));
    effects
}

/// Resolves `request` as the shell would and feeds the resulting events
/// back into the app.
pub fn resolve<Op: Operation>(
    app: &Tester,
    model: &mut Model,
    request: &mut Request<Op>,
    output: Op::Output,
) -> Effects {
    let update = app.resolve(request, output).expect("request should resolve");
    let mut effects = Effects::default();
    for event in update.events {
        effects.absorb(app.update(event, model));
    }
    effects
}

pub fn reply(status: u16, body: &str) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(status).body(body.as_bytes().to_vec()).build())
}

pub fn ok(body: &str) -> HttpResult {
    reply(200, body)
}

pub fn created(id: i64) -> HttpResult {
    reply(
        201,
        &format!(r#"{{"message":"Incident reported","id":{id}}}"#),
    )
}
