use serde::{Deserialize, Serialize};

use crux_core::capability::{Capability, CapabilityContext, Operation};

/// Hands control to a platform URL handler (`sms:`, `tel:`). Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigateOperation {
    Open { href: String },
}

impl Operation for NavigateOperation {
    type Output = ();
}

pub struct Navigate<Ev> {
    context: CapabilityContext<NavigateOperation, Ev>,
}

impl<Ev> Clone for Navigate<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Navigate<Ev> {
    type Operation = NavigateOperation;
    type MappedSelf<MappedEv> = Navigate<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Navigate::new(self.context.map_event(f))
    }
}

impl<Ev> Navigate<Ev> {
    pub fn new(context: CapabilityContext<NavigateOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Navigate<Ev>
where
    Ev: Send + 'static,
{
    pub fn open(&self, href: impl Into<String>) {
        let href = href.into();
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(NavigateOperation::Open { href }).await;
        });
    }
}
