//! EventBus actor fanning record events out to subscribers

use super::message::{GetSubscriberCount, RecordEvent, Subscribe, Unsubscribe};
use actix::prelude::*;
use std::collections::HashMap;

pub struct EventBus {
    next_id: usize,
    mailbox_capacity: usize,
    subscribers: HashMap<usize, Recipient<RecordEvent>>,
}

impl EventBus {
    pub fn new(mailbox_capacity: usize) -> Self {
        Self {
            next_id: 0,
            mailbox_capacity,
            subscribers: HashMap::new(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::app_config::EventConfig::default().mailbox_capacity)
    }
}

impl Actor for EventBus {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.set_mailbox_capacity(self.mailbox_capacity);
        log::info!("EventBus started");
    }
}

impl Handler<Subscribe> for EventBus {
    type Result = usize;

    fn handle(&mut self, msg: Subscribe, _: &mut Context<Self>) -> Self::Result {
        self.next_id += 1;
        self.subscribers.insert(self.next_id, msg.0);
        log::debug!("EventBus subscriber {} registered", self.next_id);
        self.next_id
    }
}

impl Handler<Unsubscribe> for EventBus {
    type Result = ();

    fn handle(&mut self, msg: Unsubscribe, _: &mut Context<Self>) {
        if self.subscribers.remove(&msg.0).is_some() {
            log::debug!("EventBus subscriber {} removed", msg.0);
        }
    }
}

impl Handler<RecordEvent> for EventBus {
    type Result = ();

    fn handle(&mut self, msg: RecordEvent, _: &mut Context<Self>) {
        self.subscribers.retain(|id, recipient| {
            if !recipient.connected() {
                log::debug!("EventBus subscriber {} gone, removing", id);
                return false;
            }
            recipient.do_send(msg.clone());
            true
        });
    }
}

impl Handler<GetSubscriberCount> for EventBus {
    type Result = usize;

    fn handle(&mut self, _: GetSubscriberCount, _: &mut Context<Self>) -> Self::Result {
        self.subscribers.len()
    }
}

/// Subscriber writing every event to the log.
#[derive(Default)]
pub struct EventLogger;

impl Actor for EventLogger {
    type Context = Context<Self>;
}

impl Handler<RecordEvent> for EventLogger {
    type Result = ();

    fn handle(&mut self, msg: RecordEvent, _: &mut Context<Self>) {
        match serde_json::to_string(&msg) {
            Ok(json) => log::info!("{}", json),
            Err(e) => log::warn!("Failed to serialize record event: {}", e),
        }
    }
}
