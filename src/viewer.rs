use iced::widget::{container, image as iced_image};
use iced::{Element, Event, Length, Subscription, Task, event, keyboard, window};
use image::RgbImage;
use region_browser::{
    Error, Result,
    browser::{KeyCommand, RegionBrowser, RunState},
};

pub const WINDOW_TITLE: &str = "Selective Search output";

/// Opens the browser window and blocks until the user quits or closes it.
pub fn run(browser: RegionBrowser) -> Result<()> {
    let (width, height) = browser.base().dimensions();
    iced::application(
        move || Viewer::new(browser.clone()),
        Viewer::update,
        Viewer::view,
    )
    .title(|_state: &Viewer| WINDOW_TITLE.to_string())
    .subscription(Viewer::subscription)
    .window_size((width as f32, height as f32))
    .run()
    .map_err(|err| Error::Window(err.to_string()))
}

struct Viewer {
    browser: RegionBrowser,
    frame: iced_image::Handle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Message {
    Key(KeyCommand),
}

impl Viewer {
    fn new(browser: RegionBrowser) -> (Self, Task<Message>) {
        let frame = to_handle(browser.frame());
        (Self { browser, frame }, Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Key(key) => {
                let before = self.browser.state();
                match self.browser.press(key) {
                    RunState::Stopped => iced::exit(),
                    RunState::Running => {
                        if self.browser.state() != before {
                            self.frame = to_handle(self.browser.frame());
                        }
                        Task::none()
                    }
                }
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        container(iced_image::Image::new(self.frame.clone()))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(key_command)
    }
}

fn key_command(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(event) => key_message(&event),
        _ => None,
    }
}

/// Every physical key press becomes exactly one message. Auto-repeat and
/// release events are dropped.
fn key_message(event: &keyboard::Event) -> Option<Message> {
    match event {
        keyboard::Event::KeyPressed {
            key, repeat: false, ..
        } => {
            let command = match key.as_ref() {
                keyboard::Key::Character(text) => KeyCommand::from_text(text),
                _ => KeyCommand::Other,
            };
            Some(Message::Key(command))
        }
        _ => None,
    }
}

fn to_handle(frame: RgbImage) -> iced_image::Handle {
    let (width, height) = frame.dimensions();
    // Extend to RGBA for Iced
    let rgba = image::DynamicImage::ImageRgb8(frame).into_rgba8();
    iced_image::Handle::from_rgba(width, height, rgba.into_raw())
}
