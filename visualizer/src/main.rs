use std::time::{Duration, Instant};

use clap::Parser;
use feed::FeedEvent;
use iced::{
    keyboard, mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        center, column, container, image, mouse_area, opaque, stack, text,
    },
    window, Color, ContentFit, Element, Length, Point, Rectangle, Renderer, Size, Subscription,
    Task, Theme,
};
use trailcore::map::{MapHost, Viewport, WebMercatorMap};
use trailcore::prelude::{GeoPoint, PointRecord};
use trailcore::{AppEvent, KeyInput, TrailApp};

mod feed;

#[derive(Parser)]
#[command(author, version, about = "Skytrail live position map")]
struct Args {
    /// Base URL of the feed server (history endpoint + websocket)
    #[arg(long, default_value = "http://127.0.0.1:12345")]
    server: String,
    /// Initial map center, longitude first
    #[arg(long, default_value_t = 44.78)]
    center_lon: f64,
    #[arg(long, default_value_t = 41.70)]
    center_lat: f64,
    #[arg(long, default_value_t = 9.0)]
    zoom: f64,
    /// Device pixel ratio applied to the overlay backing store
    #[arg(long, default_value_t = 1.0)]
    hidpi_scale: f32,
}

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Skytrail".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    Subscription::batch([
        feed::subscription().map(Message::Feed),
        keyboard::listen().filter_map(|event| match event {
            keyboard::Event::KeyPressed { key, modifiers, .. } => map_key(key, modifiers),
            _ => None,
        }),
        window::resize_events().map(|(_, size)| Message::WindowResized(size)),
        time::every(Duration::from_millis(100)).map(|_| Message::Tick),
    ])
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

fn map_key(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    use keyboard::key::Named;

    let input = match key {
        keyboard::Key::Named(Named::ArrowUp) => KeyInput::ArrowUp,
        keyboard::Key::Named(Named::ArrowDown) => KeyInput::ArrowDown,
        keyboard::Key::Named(Named::ArrowLeft) => KeyInput::ArrowLeft,
        keyboard::Key::Named(Named::ArrowRight) => KeyInput::ArrowRight,
        keyboard::Key::Named(Named::Escape) => KeyInput::Escape,
        keyboard::Key::Character(c) => KeyInput::Character(c.chars().next()?),
        _ => return None,
    };
    Some(Message::KeyPressed(input))
}

struct Visualizer {
    app: TrailApp,
    server: String,
    status: String,
    activity: Vec<String>,
    connected: bool,
    camera: Option<image::Handle>,
    camera_error: Option<String>,
}

#[derive(Debug, Clone)]
enum Message {
    HistoryFetched(Result<Vec<PointRecord>, String>),
    Feed(FeedEvent),
    KeyPressed(KeyInput),
    WindowResized(Size),
    Tick,
    CloseCamera,
    CameraFetched(Result<image::Handle, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let args = Args::parse();
        feed::set_server(&args.server);

        let app = TrailApp::new(
            args.center_lon,
            args.center_lat,
            args.zoom,
            Viewport::new(1024.0, 768.0, args.hidpi_scale),
        );
        let server = args.server.trim_end_matches('/').to_string();
        let fetch = Task::perform(fetch_history(server.clone()), Message::HistoryFetched);

        (
            Visualizer {
                app,
                server,
                status: "Fetching point history...".into(),
                activity: Vec::new(),
                connected: false,
                camera: None,
                camera_error: None,
            },
            fetch,
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        let now = Instant::now();
        match message {
            Message::HistoryFetched(Ok(records)) => {
                state.status = format!("History loaded: {} points", records.len());
                state.push_activity(format!("History: {} points", records.len()));
                state.app.handle(AppEvent::HistoryLoaded(records), now);
                Task::none()
            }
            Message::HistoryFetched(Err(err)) => {
                state.status = format!("History fetch failed: {err}");
                state.push_activity("History fetch failed".into());
                Task::none()
            }
            Message::Feed(FeedEvent::Connected) => {
                state.connected = true;
                state.push_activity("Feed connected".into());
                Task::none()
            }
            Message::Feed(FeedEvent::Disconnected) => {
                state.connected = false;
                state.push_activity("Feed lost, retrying".into());
                Task::none()
            }
            Message::Feed(FeedEvent::Frame(frame)) => {
                state.app.handle(AppEvent::MessageReceived(frame), now);
                Task::none()
            }
            Message::KeyPressed(input) => {
                let camera_was_open = state.app.camera_open();
                state.app.handle(AppEvent::KeyPressed(input), now);
                if state.app.camera_open() && !camera_was_open {
                    state.camera = None;
                    state.camera_error = None;
                    let url = format!("{}/camera", state.server);
                    return Task::perform(fetch_camera(url), Message::CameraFetched);
                }
                Task::none()
            }
            Message::WindowResized(size) => {
                state.app.handle(
                    AppEvent::Resized {
                        width: size.width,
                        height: size.height,
                    },
                    now,
                );
                Task::none()
            }
            Message::Tick => {
                state.app.handle(AppEvent::Tick, now);
                Task::none()
            }
            Message::CloseCamera => {
                state.app.close_camera();
                Task::none()
            }
            Message::CameraFetched(Ok(handle)) => {
                state.camera = Some(handle);
                Task::none()
            }
            Message::CameraFetched(Err(err)) => {
                state.camera_error = Some(err);
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let map_canvas = Canvas::new(BaseMap {
            map: state.app.map().clone(),
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let overlay = state.app.overlay();
        let trail_image = image(image::Handle::from_rgba(
            overlay.width_px(),
            overlay.height_px(),
            overlay.pixels().to_vec(),
        ))
        .content_fit(ContentFit::Fill)
        .width(Length::Fill)
        .height(Length::Fill);

        let now = Instant::now();
        let marker_canvas = Canvas::new(MarkerLayer {
            map: state.app.map().clone(),
            positions: state
                .app
                .markers()
                .active(now)
                .map(|marker| marker.position)
                .collect(),
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let metrics = state.app.metrics();
        let status_line = if state.app.ready() {
            format!(
                "{} | {} points | live {} ok / {} dropped | {}",
                state.status,
                state.app.history().len(),
                metrics.accepted(),
                metrics.discarded(),
                if state.connected {
                    "feed up"
                } else {
                    "feed down"
                },
            )
        } else {
            state.status.clone()
        };

        let readout = state
            .activity
            .iter()
            .rev()
            .fold(
                column![text(status_line).size(14)].spacing(2),
                |col, entry| col.push(text(entry.clone()).size(11)),
            );

        let mut layers = stack![
            map_canvas,
            trail_image,
            marker_canvas,
            container(readout).padding(8),
        ];

        if state.app.camera_open() {
            let camera_view: Element<'_, Message> = match (&state.camera, &state.camera_error) {
                (Some(handle), _) => image(handle.clone())
                    .width(Length::Fixed(480.0))
                    .into(),
                (None, Some(err)) => text(format!("Camera offline: {err}")).size(14).into(),
                (None, None) => text("Fetching camera view...").size(14).into(),
            };
            let panel = container(
                column![
                    text("Camera view").size(20),
                    camera_view,
                    button("Close").on_press(Message::CloseCamera).padding(8),
                ]
                .spacing(12)
                .align_x(iced::Alignment::Center),
            )
            .padding(16)
            .style(container::rounded_box);

            layers = layers.push(opaque(
                mouse_area(center(opaque(panel))).on_press(Message::CloseCamera),
            ));
        }

        layers.into()
    }

    fn push_activity(&mut self, entry: String) {
        self.activity.push(entry);
        if self.activity.len() > 6 {
            self.activity.remove(0);
        }
    }
}

/// One-time startup fetch, retried a few times before giving up visibly.
async fn fetch_history(base: String) -> Result<Vec<PointRecord>, String> {
    let url = format!("{base}/points_history");
    let mut last_error = String::from("no attempt made");

    for attempt in 0..3 {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
        let body = match reqwest::get(&url).await {
            Ok(response) => response.text().await.map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };
        match body.and_then(|text| {
            trailcore::feed::decode_history(&text).map_err(|err| err.to_string())
        }) {
            Ok(records) => return Ok(records),
            Err(err) => last_error = err,
        }
    }

    Err(last_error)
}

async fn fetch_camera(url: String) -> Result<image::Handle, String> {
    let response = reqwest::get(&url).await.map_err(|err| err.to_string())?;
    if !response.status().is_success() {
        return Err(format!("endpoint returned {}", response.status()));
    }
    let bytes = response.bytes().await.map_err(|err| err.to_string())?;
    Ok(image::Handle::from_bytes(bytes.to_vec()))
}

/// Dark base map: graticule plus center crosshair, drawn under the trail
/// overlay. No tile imagery; the grid keeps the pan/zoom state legible.
struct BaseMap {
    map: WebMercatorMap,
}

impl BaseMap {
    fn graticule_step(&self) -> f64 {
        match self.map.zoom() {
            z if z >= 11.0 => 0.1,
            z if z >= 9.0 => 0.25,
            z if z >= 7.0 => 1.0,
            z if z >= 4.0 => 5.0,
            _ => 15.0,
        }
    }
}

impl canvas::Program<Message> for BaseMap {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.04, 0.05, 0.08),
        );

        let step = self.graticule_step();
        let center = self.map.center();
        let grid_stroke = Stroke::default()
            .with_width(1.0)
            .with_color(Color::from_rgba(0.5, 0.55, 0.65, 0.25));

        // Meridians: walk outward from the center until off-screen.
        let start_lon = (center.lon / step).floor() * step;
        for i in -40..=40i32 {
            let lon = start_lon + i as f64 * step;
            let x = self.map.project(GeoPoint::new(center.lat, lon)).x;
            if x < 0.0 || x > bounds.width {
                continue;
            }
            let line = Path::line(Point::new(x, 0.0), Point::new(x, bounds.height));
            frame.stroke(&line, grid_stroke);
        }

        // Parallels.
        let start_lat = (center.lat / step).floor() * step;
        for i in -40..=40i32 {
            let lat = (start_lat + i as f64 * step).clamp(-85.0, 85.0);
            let y = self.map.project(GeoPoint::new(lat, center.lon)).y;
            if y < 0.0 || y > bounds.height {
                continue;
            }
            let line = Path::line(Point::new(0.0, y), Point::new(bounds.width, y));
            frame.stroke(&line, grid_stroke);
        }

        let mid = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        let crosshair = Path::new(|builder| {
            builder.move_to(Point::new(mid.x - 8.0, mid.y));
            builder.line_to(Point::new(mid.x + 8.0, mid.y));
            builder.move_to(Point::new(mid.x, mid.y - 8.0));
            builder.line_to(Point::new(mid.x, mid.y + 8.0));
        });
        frame.stroke(
            &crosshair,
            Stroke::default()
                .with_width(1.0)
                .with_color(Color::from_rgba(0.8, 0.8, 0.85, 0.6)),
        );

        vec![frame.into_geometry()]
    }
}

/// Transient highlights for freshly arrived points, re-projected every frame
/// so they stay anchored while the view moves.
struct MarkerLayer {
    map: WebMercatorMap,
    positions: Vec<GeoPoint>,
}

impl canvas::Program<Message> for MarkerLayer {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        for position in &self.positions {
            let pixel = self.map.project(*position);
            if pixel.x < 0.0 || pixel.x > bounds.width || pixel.y < 0.0 || pixel.y > bounds.height
            {
                continue;
            }
            let ring = Path::new(|builder| {
                builder.circle(Point::new(pixel.x, pixel.y), 6.0);
            });
            frame.fill(&ring, Color::from_rgba(1.0, 1.0, 1.0, 0.25));
            frame.stroke(
                &ring,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgb(0.95, 0.55, 0.2)),
            );
        }

        vec![frame.into_geometry()]
    }
}
