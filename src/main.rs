//! Rally entry point
//!
//! On the web this wires the engine to a canvas, DOM text overlays and an
//! optional video element. Natively it runs a headless autoplay session and
//! logs every intent the engine emits.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlMediaElement,
        KeyboardEvent, WheelEvent, Window,
    };

    use rally::audio::{AudioManager, Sound};
    use rally::platform::{ControlEvent, KeyDirection};
    use rally::render::{RenderTarget, draw_scene};
    use rally::sim::Arena;
    use rally::{EngineConfig, Frame, Intent, Preset, SequenceController, SequenceStage, TerminalAction};

    const CANVAS_ID: &str = "canvas";
    const VIDEO_ID: &str = "video";
    const START_MESSAGE_ID: &str = "start-message";
    const PHRASE_ID: &str = "phrase";
    const GAME_OVER_ID: &str = "game-over";

    /// Canvas 2D context as a render target
    struct CanvasTarget {
        ctx: CanvasRenderingContext2d,
        width: f32,
        height: f32,
    }

    impl RenderTarget for CanvasTarget {
        fn clear(&mut self) {
            self.ctx
                .clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
        }

        fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &str) {
            self.ctx.set_fill_style_str(color);
            self.ctx
                .fill_rect(x as f64, y as f64, width as f64, height as f64);
        }

        fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str) {
            self.ctx.set_fill_style_str(color);
            self.ctx.begin_path();
            if self
                .ctx
                .arc(x as f64, y as f64, radius as f64, 0.0, std::f64::consts::TAU)
                .is_ok()
            {
                self.ctx.fill();
            }
        }

        fn size(&self) -> (f32, f32) {
            (self.width, self.height)
        }
    }

    /// Everything the page owns for one engine instance
    struct Host {
        controller: SequenceController,
        target: CanvasTarget,
        canvas: HtmlCanvasElement,
        document: Document,
        video: Option<HtmlMediaElement>,
        audio: AudioManager,
        last_time: f64,
    }

    impl Host {
        fn frame(&mut self, time: f64) {
            let dt_ms = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                0.0
            };
            self.last_time = time;

            let mut frame = Frame::elapsed(dt_ms);
            if let Some(video) = &self.video {
                frame = frame.with_playback(video.current_time());
                self.audio.set_muted(video.muted());
            }

            for intent in self.controller.advance(frame) {
                self.apply(intent);
            }

            let palette = self.controller.config().palette.clone();
            draw_scene(&mut self.target, &self.controller.view(), &palette);
        }

        fn apply(&mut self, intent: Intent) {
            log::debug!("Intent: {intent:?}");
            match intent {
                Intent::ShowStartMessage => self.set_visible(START_MESSAGE_ID, true),
                Intent::ClearStartMessage => self.set_visible(START_MESSAGE_ID, false),
                Intent::RunStarted => {
                    self.set_visible(GAME_OVER_ID, false);
                    self.set_phrase("");
                }
                Intent::PlaySound(id) => self.audio.play_id(&id),
                Intent::RevealText { .. } => {
                    let text = self.controller.view().revealed.to_string();
                    self.set_phrase(&text);
                }
                Intent::FadeOutText { duration_ms } => {
                    if let Some(el) = self.html_element(PHRASE_ID) {
                        let style = el.style();
                        let _ = style
                            .set_property("transition", &format!("opacity {duration_ms}ms"));
                        let _ = style.set_property("opacity", "0");
                    }
                }
                Intent::HideText => {
                    if let Some(el) = self.html_element(PHRASE_ID) {
                        let _ = el.style().set_property("display", "none");
                    }
                }
                Intent::Terminal(action) => self.on_terminal(action),
                Intent::ShowGameOver => {
                    self.set_visible(GAME_OVER_ID, true);
                    self.audio.play(Sound::GameOver);
                }
                Intent::Restarted => {
                    self.set_phrase("");
                    if let Some(el) = self.html_element(PHRASE_ID) {
                        let style = el.style();
                        let _ = style.remove_property("transition");
                        let _ = style.remove_property("opacity");
                        let _ = style.remove_property("display");
                    }
                }
            }
        }

        fn on_terminal(&mut self, action: TerminalAction) {
            match action {
                TerminalAction::Freeze | TerminalAction::Reset => {}
                TerminalAction::StopRendering => log::info!("Rendering stopped"),
                TerminalAction::RevealMedia => {
                    let _ = self.canvas.style().set_property("display", "none");
                    if let Some(video) = &self.video {
                        let _ = video.set_attribute("class", "");
                        let _ = video.play();
                    }
                }
                TerminalAction::Navigate { url } => {
                    if let Some(window) = web_sys::window()
                        && let Err(e) = window.location().set_href(&url)
                    {
                        log::warn!("Navigation to {url} failed: {e:?}");
                    }
                }
            }
        }

        fn resize(&mut self, width: f32, height: f32) {
            self.canvas.set_width(width as u32);
            self.canvas.set_height(height as u32);
            self.target.width = width;
            self.target.height = height;
            self.controller
                .handle_input(ControlEvent::Resize { width, height });
        }

        fn html_element(&self, id: &str) -> Option<HtmlElement> {
            self.document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        }

        fn set_phrase(&self, text: &str) {
            if let Some(el) = self.document.get_element_by_id(PHRASE_ID) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn viewport(window: &Window) -> (f32, f32) {
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        (width as f32, height as f32)
    }

    /// Preset from the `?preset=` query parameter
    fn preset_from_location(window: &Window) -> Preset {
        let search = window.location().search().unwrap_or_default();
        search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.strip_prefix("preset="))
            .find_map(Preset::from_name)
            .unwrap_or_default()
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;
        let video = document
            .get_element_by_id(VIDEO_ID)
            .and_then(|el| el.dyn_into::<HtmlMediaElement>().ok());

        let preset = preset_from_location(&window);
        let (width, height) = viewport(&window);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let config = EngineConfig::from_preset(preset);
        let controller = SequenceController::new(config, Arena::new(width, height))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Rally starting with preset {}", preset.as_str());

        let host = Rc::new(RefCell::new(Host {
            controller,
            target: CanvasTarget { ctx, width, height },
            canvas,
            document,
            video,
            audio: AudioManager::new(),
            last_time: 0.0,
        }));

        setup_input_handlers(&window, host.clone())?;
        request_animation_frame(host);
        Ok(())
    }

    fn setup_input_handlers(window: &Window, host: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        // Arrow keys move the paddle; Enter restarts a lost run
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut h = host.borrow_mut();
                h.audio.resume();
                let key = event.key();
                if let Some(direction) = KeyDirection::from_key(&key) {
                    event.prevent_default();
                    h.controller.handle_input(ControlEvent::Key(direction));
                } else if key == "Enter" && h.controller.stage() == SequenceStage::Lost {
                    // The frame loop went idle when the run was lost
                    h.controller.restart();
                    h.set_visible(GAME_OVER_ID, false);
                    drop(h);
                    request_animation_frame(host.clone());
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Horizontal trackpad swipes
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                let delta_x = event.delta_x() as f32;
                if delta_x != 0.0 {
                    host.borrow_mut()
                        .controller
                        .handle_input(ControlEvent::Wheel { delta_x });
                }
            });
            window.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Viewport resize and orientation change
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(window) = web_sys::window() else { return };
                let (width, height) = viewport(&window);
                host.borrow_mut().resize(width, height);
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        let keep_going = {
            let mut h = host.borrow_mut();
            h.frame(time);
            h.controller.wants_frames()
        };

        if keep_going {
            request_animation_frame(host);
        } else {
            host.borrow_mut().last_time = 0.0;
            log::info!("Frame loop idle");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use clap::Parser;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use rally::config::Trigger;
    use rally::platform::ControlEvent;
    use rally::sim::Arena;
    use rally::{EngineConfig, EngineError, Frame, Intent, Preset, SequenceController};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u64 = 60 * 60 * 5;
    /// Largest paddle move per frame the bot may request
    const BOT_SPEED: f32 = 14.0;
    const BOT_JITTER: f32 = 6.0;

    /// Headless autoplay runner for rally configurations
    #[derive(Parser, Debug, Clone)]
    #[command(name = "rally")]
    #[command(about = "Run a rally configuration headlessly with a paddle bot", long_about = None)]
    pub struct Args {
        /// Preset name (classic, tennis, tennis_video, ...) or path to a JSON config
        #[arg(default_value = "tennis")]
        pub source: String,

        /// Seed for the bot's aim jitter
        #[arg(long, default_value_t = 0x5eed)]
        pub seed: u64,

        /// Arena width
        #[arg(long, default_value_t = 1280.0)]
        pub width: f32,

        /// Arena height
        #[arg(long, default_value_t = 720.0)]
        pub height: f32,
    }

    pub struct Options {
        pub config: EngineConfig,
        pub label: String,
        pub seed: u64,
        pub arena: Arena,
    }

    /// Resolve the configuration named on the command line
    pub fn load_options(args: Args) -> Result<Options, EngineError> {
        let config = if args.source.ends_with(".json") {
            EngineConfig::load(&args.source)?
        } else {
            let preset = Preset::from_name(&args.source)
                .ok_or_else(|| EngineError::UnknownPreset(args.source.clone()))?;
            EngineConfig::from_preset(preset)
        };

        Ok(Options {
            config,
            label: args.source,
            seed: args.seed,
            arena: Arena::new(args.width, args.height),
        })
    }

    /// Drive a run to completion with a jittery paddle bot
    pub fn run(options: Options) -> Result<(), EngineError> {
        let Options {
            config,
            label,
            seed,
            arena,
        } = options;
        let playback_trigger = matches!(config.sequence.trigger, Trigger::Playback { .. });
        let mut controller = SequenceController::new(config, arena)?;
        let mut rng = Pcg32::seed_from_u64(seed);
        log::info!("Autoplay {label} (seed {seed}) on {}x{}", arena.width, arena.height);

        let mut frames = 0u64;
        while frames < MAX_FRAMES && controller.wants_frames() {
            frames += 1;

            if let Some(paddle) = &controller.state().paddle {
                let ball_x = controller.state().ball.pos.x;
                let error = ball_x - (paddle.x + paddle.width / 2.0)
                    + rng.random_range(-BOT_JITTER..=BOT_JITTER);
                let step = error.clamp(-BOT_SPEED, BOT_SPEED);
                // Wheel deltas move the paddle the opposite way
                controller.handle_input(ControlEvent::Wheel { delta_x: -step });
            }

            let mut frame = Frame::elapsed(FRAME_MS);
            if playback_trigger {
                frame = frame.with_playback(frames as f64 * FRAME_MS / 1000.0);
            }

            let mut terminal = false;
            for intent in controller.advance(frame) {
                log::info!("[frame {frames}] {intent:?}");
                terminal |= matches!(intent, Intent::Terminal(_) | Intent::ShowGameOver);
            }
            if terminal {
                break;
            }
        }

        let view = controller.view();
        println!(
            "{label}: {:?} after {frames} frames, {} ticks, revealed {:?}",
            view.stage,
            controller.state().time_ticks,
            view.revealed
        );
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_args_defaults() {
            let args = Args::try_parse_from(["rally"]).unwrap();
            assert_eq!(args.source, "tennis");
            assert_eq!(args.seed, 0x5eed);

            let options = load_options(args).unwrap();
            assert_eq!(options.arena, Arena::new(1280.0, 720.0));
            assert!(options.config.paddle.is_some());
        }

        #[test]
        fn test_args_seed_and_preset() {
            let args = Args::try_parse_from(["rally", "no-platform", "--seed", "42"]).unwrap();
            assert_eq!(args.seed, 42);
            let options = load_options(args).unwrap();
            assert_eq!(options.label, "no-platform");
            assert!(options.config.paddle.is_none());
        }

        #[test]
        fn test_unknown_preset_rejected() {
            let args = Args::try_parse_from(["rally", "squash"]).unwrap();
            assert!(matches!(
                load_options(args),
                Err(EngineError::UnknownPreset(name)) if name == "squash"
            ));
        }

        #[test]
        fn test_bad_seed_rejected() {
            assert!(Args::try_parse_from(["rally", "--seed", "lots"]).is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = autoplay::Args::parse();
    let result = autoplay::load_options(args).and_then(autoplay::run);
    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
