use serde::{Deserialize, Serialize};

use crux_core::capability::{Capability, CapabilityContext, Operation};

/// Platform geolocation query.
///
/// The shell maps its own failure modes onto [`LocationOutput`]; it never
/// reports a transport-level error because the core treats every non-position
/// answer the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationOperation {
    CurrentPosition {
        timeout_ms: Option<u64>,
        high_accuracy: bool,
    },
}

impl Operation for LocationOperation {
    type Output = LocationOutput;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationOutput {
    Position {
        latitude: f64,
        longitude: f64,
        accuracy_m: Option<f64>,
    },
    PermissionDenied,
    Unavailable,
    TimedOut,
    Unsupported,
}

pub struct Location<Ev> {
    context: CapabilityContext<LocationOperation, Ev>,
}

impl<Ev> Clone for Location<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<Ev> Location<Ev> {
    pub fn new(context: CapabilityContext<LocationOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Location<Ev>
where
    Ev: Send + 'static,
{
    pub fn current_position<F>(&self, timeout_ms: Option<u64>, make_event: F)
    where
        F: FnOnce(LocationOutput) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(LocationOperation::CurrentPosition {
                    timeout_ms,
                    high_accuracy: true,
                })
                .await;
            ctx.update_app(make_event(output));
        });
    }
}
