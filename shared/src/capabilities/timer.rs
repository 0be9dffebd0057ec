use serde::{Deserialize, Serialize};

use crux_core::capability::{Capability, CapabilityContext, Operation};

/// One-shot delay. Display windows and deadlines in the core are expressed as
/// timer requests whose completion is delivered back as an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOperation {
    Start { millis: u64 },
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOutput {
    Elapsed,
}

pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Clone for Timer<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerOperation;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Timer::new(self.context.map_event(f))
    }
}

impl<Ev> Timer<Ev> {
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Timer<Ev>
where
    Ev: Send + 'static,
{
    pub fn after(&self, millis: u64, event: Ev) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let TimerOutput::Elapsed = ctx.request_from_shell(TimerOperation::Start { millis }).await;
            ctx.update_app(event);
        });
    }
}
