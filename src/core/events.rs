use std::{collections::HashMap, sync::{atomic::AtomicUsize, RwLock}};

#[derive(Clone)]
pub struct Progress {
    pub cur:   usize,
    pub total: usize,
}

#[derive(Clone)]
pub enum Event {
    Status(String),
    Progress(Progress),
}

type SubscriptionFun = dyn Fn(Event) + Send + Sync + 'static;

pub struct EventSubscriptions {
    items:   RwLock<HashMap<usize, Box<SubscriptionFun>>>,
    next_id: AtomicUsize,
}

impl EventSubscriptions {
    pub fn new() -> Self {
        Self {
            items:   RwLock::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn subscribe(
        &self,
        fun: impl Fn(Event) + Send + Sync + 'static
    ) -> usize {
        let mut items = self.items.write().unwrap();
        let id = self.next_id.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        items.insert(id, Box::new(fun));
        id
    }

    pub fn notify(&self, event: Event) {
        let items = self.items.read().unwrap();
        for fun in items.values() {
            fun(event.clone());
        }
    }

    pub fn status(&self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{}", text);
        self.notify(Event::Status(text));
    }
}
