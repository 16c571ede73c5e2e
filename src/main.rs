//! Scratch Reveal entry point
//!
//! Wires the pure card model to the DOM: canvas painting, gate modal,
//! pointer/touch input, and the backend endpoints.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_widget {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement,
        HtmlImageElement, HtmlInputElement, MouseEvent, TouchEvent,
    };

    use scratch_reveal::card::{
        CardEvent, GatePhase, GestureEvent, OfferInstall, ScratchSession, apply_gesture,
        validate_code,
    };
    use scratch_reveal::consts::*;
    use scratch_reveal::offer::{fetch_offer, post_redemption};
    use scratch_reveal::{WidgetConfig, WidgetError};

    /// Widget instance holding all state
    struct Widget {
        session: ScratchSession,
        config: WidgetConfig,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    }

    impl Widget {
        fn new(config: WidgetConfig, canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
            Self {
                session: ScratchSession::new(canvas.width(), canvas.height()),
                config,
                canvas,
                ctx,
            }
        }

        /// Convert mouse client coordinates to surface-local coordinates
        fn mouse_pos(&self, event: &MouseEvent) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(
                event.client_x() as f32 - rect.left() as f32,
                event.client_y() as f32 - rect.top() as f32,
            )
        }

        /// Convert the first active touch point to surface-local coordinates
        fn touch_pos(&self, event: &TouchEvent) -> Option<Vec2> {
            let touch = event.touches().get(0)?;
            let rect = self.canvas.get_bounding_client_rect();
            Some(Vec2::new(
                touch.client_x() as f32 - rect.left() as f32,
                touch.client_y() as f32 - rect.top() as f32,
            ))
        }

        /// Mirror a model-side erase stroke onto the canvas
        fn paint_stroke(&self, pos: Vec2) {
            let _ = self.ctx.set_global_composite_operation("destination-out");
            self.ctx.begin_path();
            let _ = self.ctx.arc(
                pos.x as f64,
                pos.y as f64,
                SCRATCH_RADIUS as f64,
                0.0,
                std::f64::consts::TAU,
            );
            self.ctx.fill();
        }

        /// Enable or disable pointer interaction with the canvas
        fn set_pointer_events(&self, enabled: bool) {
            let value = if enabled { "auto" } else { "none" };
            let _ = self.canvas.style().set_property("pointer-events", value);
        }
    }

    // --- Small DOM helpers ---------------------------------------------------

    fn document() -> Document {
        web_sys::window().expect("no window").document().expect("no document")
    }

    fn element(id: &str) -> Option<Element> {
        document().get_element_by_id(id)
    }

    fn show(id: &str) {
        if let Some(el) = element(id) {
            let _ = el.class_list().remove_1("hidden");
        }
    }

    fn hide(id: &str) {
        if let Some(el) = element(id) {
            let _ = el.class_list().add_1("hidden");
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = element(id) {
            el.set_text_content(Some(text));
        }
    }

    /// One-shot timer wrapper around `window.setTimeout`
    fn set_timeout(ms: i32, f: impl FnOnce() + 'static) {
        let closure = Closure::once(f);
        let _ = web_sys::window()
            .expect("no window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                ms,
            );
        closure.forget();
    }

    // --- Modal alert ---------------------------------------------------------

    /// The single modal notification primitive all user-visible messages use.
    fn show_alert(title: &str, message: &str) {
        set_text("alertTitle", title);
        set_text("alertMessage", message);
        show("customAlert");
        if let Some(inner) = element("customAlert")
            .and_then(|el| el.query_selector(".transform").ok().flatten())
        {
            let _ = inner.class_list().add_1("scale-100");
        }
    }

    fn show_error(err: &WidgetError) {
        show_alert(err.title(), &err.to_string());
    }

    fn setup_alert_close() {
        if let Some(btn) = element("alertCloseButton") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                if let Some(inner) = element("customAlert")
                    .and_then(|el| el.query_selector(".transform").ok().flatten())
                {
                    let _ = inner.class_list().remove_1("scale-100");
                }
                // Let the scale transition finish before hiding
                set_timeout(300, || hide("customAlert"));
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    // --- Confetti ------------------------------------------------------------

    const CONFETTI_COLORS: [&str; 6] = ["#f0f", "#0ff", "#ff0", "#f00", "#0f0", "#00f"];

    fn launch_confetti() {
        let Some(container) = element("confetti-container") else {
            return;
        };
        let doc = document();
        let mut rng = Pcg32::seed_from_u64(js_sys::Date::now() as u64);

        for _ in 0..CONFETTI_COUNT {
            let Ok(piece) = doc.create_element("div") else {
                continue;
            };
            let _ = piece.class_list().add_1("confetti");
            if let Some(html) = piece.dyn_ref::<HtmlElement>() {
                let style = html.style();
                let color = CONFETTI_COLORS[rng.random_range(0..CONFETTI_COLORS.len())];
                let _ = style.set_property("background-color", color);
                let _ = style.set_property("left", &format!("{}%", rng.random_range(0.0..100.0)));
                let _ = style.set_property("top", &format!("{}%", rng.random_range(0.0..100.0)));
                let _ = style.set_property(
                    "--x",
                    &format!("{}px", (rng.random::<f32>() - 0.5) * 500.0),
                );
                let _ = style.set_property(
                    "--y",
                    &format!("{}px", 500.0 + rng.random::<f32>() * 200.0),
                );
                let _ = style.set_property("--rot", &format!("{}deg", rng.random::<f32>() * 720.0));
            }
            let _ = container.append_child(&piece);

            // Remove the piece when its animation ends
            let piece_clone = piece.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                piece_clone.remove();
            });
            let _ = piece
                .add_event_listener_with_callback("animationend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    // --- Image loading -------------------------------------------------------

    /// Resolve once the image element has settled its `src`. Errors map to
    /// [`WidgetError::ImageLoad`]; the caller decides how the latch resolves.
    async fn await_image(img: &HtmlImageElement, src: &str) -> Result<(), WidgetError> {
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            img.set_onload(Some(&resolve));
            img.set_onerror(Some(&reject));
        });
        img.set_src(src);
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|_| WidgetError::ImageLoad(src.to_string()))
    }

    // --- Completion ----------------------------------------------------------

    fn handle_completion(widget: &Rc<RefCell<Widget>>) {
        let (name, config) = {
            let w = widget.borrow();
            w.set_pointer_events(false);
            let name = w
                .session
                .current_offer
                .as_ref()
                .map(|o| o.name.clone())
                .unwrap_or_default();
            (name, w.config.clone())
        };

        show("offerDisplay");
        set_text("offerName", &name);
        show("revealImage");
        set_text("mainHeading", "YOU WON!");
        launch_confetti();
        show_alert("You Won!", &name);

        // Best-effort counter bump; failures are logged inside
        wasm_bindgen_futures::spawn_local(async move {
            post_redemption(&config).await;
        });
    }

    // --- Scratch input -------------------------------------------------------

    fn route_gesture(widget: &Rc<RefCell<Widget>>, event: GestureEvent) {
        let outcome = {
            let mut w = widget.borrow_mut();
            let outcome = apply_gesture(&mut w.session, event);
            if let Some(pos) = outcome.erased_at {
                w.paint_stroke(pos);
            }
            outcome
        };
        if outcome.event == Some(CardEvent::RevealCompleted) {
            handle_completion(widget);
        }
    }

    fn setup_input_handlers(widget: Rc<RefCell<Widget>>) {
        let canvas = widget.borrow().canvas.clone();

        // Mouse down
        {
            let widget = widget.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = widget.borrow().mouse_pos(&event);
                route_gesture(&widget, GestureEvent::Down(pos));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move
        {
            let widget = widget.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = widget.borrow().mouse_pos(&event);
                route_gesture(&widget, GestureEvent::Move(pos));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up
        {
            let widget = widget.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                route_gesture(&widget, GestureEvent::Up);
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse leave
        {
            let widget = widget.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                route_gesture(&widget, GestureEvent::Leave);
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let widget = widget.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = widget.borrow().touch_pos(&event) {
                    route_gesture(&widget, GestureEvent::Down(pos));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let widget = widget.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = widget.borrow().touch_pos(&event) {
                    route_gesture(&widget, GestureEvent::Move(pos));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let widget = widget.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                route_gesture(&widget, GestureEvent::Up);
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    // --- Card initialization -------------------------------------------------

    /// Initialize (or re-initialize) the scratch card: reset the session,
    /// draw the cover, fetch the offer, and enable interaction only after
    /// both the cover and reveal images have settled.
    async fn initialize_card(widget: Rc<RefCell<Widget>>) {
        log::info!("Initializing scratch card");

        show("scratch-area");
        show("loadingMessage");
        hide("offerDisplay");
        hide("revealImage");
        set_text("mainHeading", "Scratch to Win!");

        // Size the canvas to its parent and start a new round
        let token = {
            let mut w = widget.borrow_mut();
            if let Some(parent) = w.canvas.parent_element() {
                w.canvas.set_width(parent.client_width().max(0) as u32);
                w.canvas.set_height(parent.client_height().max(0) as u32);
            }
            w.set_pointer_events(false);
            let (width, height) = (w.canvas.width(), w.canvas.height());
            w.session.begin_round(width, height)
        };

        let config = widget.borrow().config.clone();
        let mut fatal = false;

        // 1. Cover image: drawn opaque, then strokes punch through it
        match HtmlImageElement::new() {
            Ok(cover) => match await_image(&cover, &config.cover_image_path).await {
                Ok(()) => {
                    let w = widget.borrow();
                    let (cw, ch) = (w.canvas.width() as f64, w.canvas.height() as f64);
                    let _ = w.ctx.set_global_composite_operation("source-over");
                    w.ctx.clear_rect(0.0, 0.0, cw, ch);
                    let _ = w
                        .ctx
                        .draw_image_with_html_image_element_and_dw_and_dh(&cover, 0.0, 0.0, cw, ch);
                    let _ = w.ctx.set_global_composite_operation("destination-out");
                }
                Err(err) => {
                    log::error!("Cover image failed: {err}");
                    set_text("loadingMessage", "Error loading cover image.");
                    show_error(&err);
                    widget.borrow_mut().session.fail(&err);
                    fatal = true;
                }
            },
            Err(_) => {
                let err = WidgetError::ImageLoad(config.cover_image_path.clone());
                show_error(&err);
                widget.borrow_mut().session.fail(&err);
                fatal = true;
            }
        }

        // 2. Offer fetch, then the reveal image
        match fetch_offer(&config).await {
            Ok(offer) => {
                let image_url = config.offer_image_url(&offer.image);
                let name = offer.name.clone();
                let install = widget.borrow_mut().session.install_offer(token, offer);
                match install {
                    OfferInstall::Stale => {
                        // A newer initialization owns the UI now
                        return;
                    }
                    OfferInstall::Exhausted => {
                        log::info!("No offers left; showing card pre-revealed");
                        let w = widget.borrow();
                        w.ctx.clear_rect(
                            0.0,
                            0.0,
                            w.canvas.width() as f64,
                            w.canvas.height() as f64,
                        );
                        drop(w);
                        if let Some(img) = element("revealImage")
                            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
                        {
                            img.set_src(&image_url);
                        }
                        show("revealImage");
                        show("offerDisplay");
                        set_text("offerName", &name);
                        show_alert("Out of Luck!", "Sorry, all our offers have been redeemed.");
                        fatal = true;
                    }
                    OfferInstall::Ready => {
                        if let Some(img) = element("revealImage")
                            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
                        {
                            if let Err(err) = await_image(&img, &image_url).await {
                                log::error!("Reveal image failed: {err}");
                                set_text("loadingMessage", "Error loading offer image.");
                                show_error(&err);
                                widget.borrow_mut().session.fail(&err);
                                fatal = true;
                            } else {
                                let style = img.style();
                                let _ = style.set_property("width", "100%");
                                let _ = style.set_property("height", "100%");
                                let _ = style.set_property("object-fit", "cover");
                            }
                        }
                    }
                }
            }
            Err(err) => {
                log::error!("Offer fetch failed: {err}");
                set_text("loadingMessage", "Failed to load offers. Please try again.");
                show_error(&err);
                widget.borrow_mut().session.fail(&err);
                fatal = true;
            }
        }

        // Both images have settled (successfully or not): resolve the
        // loading latch so the UI never hangs, and enable scratching only
        // on the clean path.
        hide("loadingMessage");
        let mut w = widget.borrow_mut();
        if !fatal {
            w.session.enable_interaction();
        }
        let enabled = w.session.interaction_enabled();
        w.set_pointer_events(enabled);
        if enabled {
            log::info!("Scratch card ready");
        }
    }

    // --- Gate ----------------------------------------------------------------

    /// Drive the gate's fixed timer sequence after a valid code, then hand
    /// off to card initialization.
    fn run_gate_sequence(widget: Rc<RefCell<Widget>>) {
        hide("invoiceInput");
        hide("invoiceSubmitButton");
        hide("invoicePromptText");
        show("authenticationMessage");

        let auth = GatePhase::AwaitingCode.advance();
        if let Some(text) = auth.status_text() {
            set_text("authenticationMessage", text);
        }
        set_timeout(auth.delay_ms().unwrap_or(0), move || {
            let success = auth.advance();
            if let Some(text) = success.status_text() {
                set_text("authenticationMessage", text);
            }
            if let Some(el) = element("authenticationMessage") {
                let _ = el.class_list().add_1("text-green-600");
            }
            set_timeout(success.delay_ms().unwrap_or(0), move || {
                hide("invoiceAuthenticationModal");
                wasm_bindgen_futures::spawn_local(initialize_card(widget));
            });
        });
    }

    fn setup_gate(widget: Rc<RefCell<Widget>>) {
        let Some(btn) = element("invoiceSubmitButton") else {
            log::error!("Gate submit button missing");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let code = element("invoiceInput")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();

            match validate_code(&code) {
                Ok(()) => run_gate_sequence(widget.clone()),
                Err(err) => show_error(&err),
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // --- Entry ---------------------------------------------------------------

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Scratch Reveal starting...");

        let config = WidgetConfig::load();

        let canvas: HtmlCanvasElement = document()
            .get_element_by_id("scratchCanvas")
            .expect("no scratch canvas")
            .dyn_into()
            .expect("not a canvas");
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .expect("2d context")
            .expect("2d context unavailable")
            .dyn_into()
            .expect("not a 2d context");

        let widget = Rc::new(RefCell::new(Widget::new(config, canvas, ctx)));

        setup_alert_close();
        setup_input_handlers(widget.clone());
        setup_gate(widget);

        // The gate precedes the card: show the modal, keep the card hidden
        show("invoiceAuthenticationModal");
        hide("scratch-area");

        log::info!("Scratch Reveal ready, waiting at gate");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_widget::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Scratch Reveal (native) starting...");
    log::info!("The widget targets the browser - run with `trunk serve` for the web version");

    // Headless smoke run of the card model
    println!("\nRunning headless scratch demo...");
    demo_scratch_to_reveal();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn demo_scratch_to_reveal() {
    use glam::Vec2;
    use scratch_reveal::card::{CardEvent, GestureEvent, OfferInstall, apply_gesture};
    use scratch_reveal::{Offer, ScratchSession};

    let mut session = ScratchSession::new(300, 200);
    let token = session.begin_round(300, 200);
    let install = session.install_offer(
        token,
        Offer {
            name: "10% Off".to_string(),
            image: "a.png".to_string(),
            message: None,
        },
    );
    assert!(install == OfferInstall::Ready);
    session.enable_interaction();

    let mut completed = false;
    'outer: for row in 0..6 {
        let y = 15.0 + row as f32 * 35.0;
        apply_gesture(&mut session, GestureEvent::Down(Vec2::new(0.0, y)));
        for step in 1..=15 {
            let x = step as f32 * 20.0;
            let outcome = apply_gesture(&mut session, GestureEvent::Move(Vec2::new(x, y)));
            if outcome.event == Some(CardEvent::RevealCompleted) {
                completed = true;
                break 'outer;
            }
        }
        apply_gesture(&mut session, GestureEvent::Up);
    }

    assert!(completed, "Scratch demo should reach the reveal threshold");
    println!(
        "✓ Revealed at {:.1}% coverage: {}",
        session.surface.coverage(),
        session.current_offer.as_ref().map(|o| o.name.as_str()).unwrap_or("?")
    );
}
