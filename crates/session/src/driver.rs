use std::sync::Arc;
use std::time::Duration;

use foundation::geo::LatLon;
use foundation::time::Time;
use formats::{DatasetSource, LoadError};
use layers::{RenderSurface, SurfaceEvent};
use lookup::{Candidate, Geocoder, LocationError, LocationProvider, LookupError};
use runtime::event_bus::Event;
use runtime::ticket::Ticket;
use scene::EntityStore;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::events::SessionEvent;
use crate::session::Session;

/// User-side commands accepted by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Surface(SurfaceEvent),
    SetCategory(Option<String>),
    SetGroup(Option<String>),
    SetAddressQuery(String),
    ChooseCandidate(usize),
    Locate,
    Dismiss,
    ShowMore,
    CloseSelection,
    ShowOnlyCategory,
    ShowOnlyGroup,
    Shutdown,
}

enum Message {
    Input(Input),
    DatasetLoaded(Result<EntityStore, LoadError>),
    Geocoded {
        ticket: Ticket,
        result: Result<Vec<Candidate>, LookupError>,
    },
    Located {
        ticket: Ticket,
        result: Result<LatLon, LocationError>,
    },
}

enum Step {
    Message(Option<Message>),
    SearchDue,
}

/// Cloneable sender for [`Input`]s.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl DriverHandle {
    /// Returns false once the driver has stopped.
    pub fn send(&self, input: Input) -> bool {
        self.tx.send(Message::Input(input)).is_ok()
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Input(input) => f.debug_tuple("Input").field(input).finish(),
            Message::DatasetLoaded(result) => f
                .debug_tuple("DatasetLoaded")
                .field(&result.as_ref().map(|s| s.len()))
                .finish(),
            Message::Geocoded { ticket, .. } => f.debug_struct("Geocoded").field("ticket", ticket).finish(),
            Message::Located { ticket, .. } => f.debug_struct("Located").field("ticket", ticket).finish(),
        }
    }
}

/// Single-threaded event loop around a [`Session`].
///
/// All mutations happen on the task running [`Driver::run`], in arrival
/// order. Lookups run as spawned tasks that only send their result back,
/// so the session never sees a half-applied update.
pub struct Driver<S> {
    session: Session<S>,
    geocoder: Arc<dyn Geocoder>,
    locator: Arc<dyn LocationProvider>,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    observer: Option<mpsc::UnboundedSender<Event<SessionEvent>>>,
    epoch: Instant,
}

impl<S: RenderSurface> Driver<S> {
    pub fn new(
        session: Session<S>,
        geocoder: Arc<dyn Geocoder>,
        locator: Arc<dyn LocationProvider>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            geocoder,
            locator,
            tx,
            rx,
            observer: None,
            epoch: Instant::now(),
        }
    }

    pub fn handle(&self) -> DriverHandle {
        DriverHandle {
            tx: self.tx.clone(),
        }
    }

    /// Session events are forwarded here after every step.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Event<SessionEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observer = Some(tx);
        rx
    }

    /// Loads the dataset in the background and processes inputs until
    /// [`Input::Shutdown`]. Returns the session for teardown.
    pub async fn run(mut self, dataset: Box<dyn DatasetSource>) -> Session<S> {
        info!(source = %dataset.describe(), "loading dataset");
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = dataset.load().await;
            let _ = tx.send(Message::DatasetLoaded(result));
        });

        loop {
            let deadline = self.session.search_deadline().map(|t| self.instant_at(t));
            let step = tokio::select! {
                message = self.rx.recv() => Step::Message(message),
                _ = wait_until(deadline) => Step::SearchDue,
            };

            match step {
                Step::SearchDue => self.start_search(),
                Step::Message(None) | Step::Message(Some(Message::Input(Input::Shutdown))) => {
                    break;
                }
                Step::Message(Some(message)) => self.dispatch(message),
            }
            self.publish();
        }

        debug!("driver stopped");
        self.session
    }

    fn dispatch(&mut self, message: Message) {
        debug!(?message, "driver step");
        let now = self.now();
        let session = &mut self.session;
        match message {
            Message::DatasetLoaded(result) => session.on_dataset_loaded(result),
            Message::Geocoded { ticket, result } => session.on_geocode_result(ticket, result),
            Message::Located { ticket, result } => session.on_location_result(ticket, result),
            Message::Input(input) => match input {
                Input::Surface(event) => session.on_surface_event(event),
                Input::SetCategory(category) => session.set_category(category),
                Input::SetGroup(group) => session.set_group(group),
                Input::SetAddressQuery(query) => session.set_address_query(now, &query),
                Input::ChooseCandidate(index) => {
                    session.choose_candidate(index);
                }
                Input::Locate => self.start_location(),
                Input::Dismiss => session.dismiss(),
                Input::ShowMore => session.show_more(),
                Input::CloseSelection => session.close_selection(),
                Input::ShowOnlyCategory => {
                    session.show_only_category();
                }
                Input::ShowOnlyGroup => {
                    session.show_only_group();
                }
                Input::Shutdown => {}
            },
        }
    }

    fn start_search(&mut self) {
        let now = self.now();
        let Some((ticket, request)) = self.session.poll_search(now) else {
            return;
        };
        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = geocoder.geocode(request).await;
            let _ = tx.send(Message::Geocoded { ticket, result });
        });
    }

    fn start_location(&mut self) {
        let Some(ticket) = self.session.request_location() else {
            return;
        };
        let locator = Arc::clone(&self.locator);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = locator.current_position().await;
            let _ = tx.send(Message::Located { ticket, result });
        });
    }

    fn publish(&mut self) {
        for event in self.session.drain_events() {
            if let Some(observer) = &self.observer
                && observer.send(event).is_err()
            {
                self.observer = None;
            }
        }
    }

    fn now(&self) -> Time {
        Time::from_millis(self.epoch.elapsed().as_millis() as u64)
    }

    fn instant_at(&self, time: Time) -> Instant {
        self.epoch + Duration::from_millis(time.as_millis())
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
